use leptos::prelude::*;

use crate::models::StoryView;
use crate::state::AppState;

fn completion_message(view: &StoryView) -> &'static str {
    match view.completion.as_deref() {
        Some("decision_limit") => "Has llegado al final de tu aventura.",
        Some("no_options") => "La historia ha llegado a su desenlace.",
        Some("generation_failed") => "La historia terminó antes de tiempo.",
        _ => "Fin del cuento.",
    }
}

/// Chapters of the live story, the current decision and the save controls.
#[component]
pub fn StoryReader() -> impl IntoView {
    let state = expect_context::<AppState>();
    let story = state.story;
    let is_waiting = state.is_waiting;
    let save_notice = state.save_notice;
    let (title, set_title) = signal(String::new());

    let on_leave = {
        let state = state.clone();
        move |_| state.leave_story()
    };

    let on_save = {
        let state = state.clone();
        move |_| {
            let title = title.get_untracked().trim().to_string();
            state.save_story((!title.is_empty()).then_some(title));
        }
    };

    view! {
        <section class="story-reader">
            {move || {
                story.get().map(|view| {
                    let interactive = view.request.branching_enabled;
                    view! {
                        <div class="story-header">
                            <span class="culture-tag">{view.request.culture.clone()}</span>
                            {interactive.then(|| view! {
                                <span class="decision-counter">
                                    {format!("Decisión {} de {}", view.decision_count, view.max_decisions)}
                                </span>
                            })}
                        </div>
                    }
                })
            }}

            <div class="chapters">
                <For
                    each=move || story.get().map(|v| v.chapters).unwrap_or_default()
                    key=|chapter| chapter.index
                    let:chapter
                >
                    <div class="chapter" class:synthetic=chapter.synthetic>
                        {(chapter.index > 0).then(|| view! { <hr class="chapter-divider" /> })}
                        {chapter.text.split("\n\n").map(|p| view! { <p>{p.to_string()}</p> }).collect_view()}
                    </div>
                </For>
            </div>

            {move || story.get().and_then(|v| v.notice).map(|notice| view! {
                <div class="generation-notice">{notice}</div>
            })}

            {move || story.get().filter(|v| v.pending || is_waiting.get()).map(|_| view! {
                <div class="pending">"Los escribas están escribiendo el siguiente capítulo…"</div>
            })}

            <OptionList />

            {move || story.get().filter(|v| v.completed).map(|v| view! {
                <div class="completion-banner">{completion_message(&v)}</div>
            })}

            <div class="story-actions">
                <input
                    type="text"
                    placeholder="Título (opcional)"
                    prop:value=title
                    on:input=move |ev| set_title.set(event_target_value(&ev))
                />
                <button class="save-btn" on:click=on_save>"Guardar cuento"</button>
                <button class="new-story-btn" on:click=on_leave>"Nuevo cuento"</button>
            </div>

            {move || save_notice.get().map(|notice| view! {
                <div class="save-notice">{notice}</div>
            })}
        </section>
    }
}

/// Option buttons for the current decision; disabled while a chapter is pending.
#[component]
fn OptionList() -> impl IntoView {
    let state = expect_context::<AppState>();
    let story = state.story;
    let is_waiting = state.is_waiting;

    view! {
        {move || {
            let view = story.get()?;
            if view.options.is_empty() {
                return None;
            }
            let state = state.clone();
            Some(view! {
                <div class="decision">
                    <h3>"¿Qué camino eliges?"</h3>
                    {view.options
                        .into_iter()
                        .map(|option| {
                            let state = state.clone();
                            let label = option.label.clone();
                            view! {
                                <button
                                    class="option-btn"
                                    disabled=move || is_waiting.get()
                                    on:click=move |_| state.choose(label.clone())
                                >
                                    {format!("{}) {}", option.label, option.text)}
                                </button>
                            }
                        })
                        .collect_view()}
                </div>
            })
        }}
    }
}
