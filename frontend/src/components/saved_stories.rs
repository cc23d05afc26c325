use leptos::prelude::*;

use crate::models::SavedStory;
use crate::state::AppState;

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Saved stories list with statistics, a read-only reader and deletion.
#[component]
pub fn SavedStories() -> impl IntoView {
    let state = expect_context::<AppState>();
    let stories = state.stories;
    let stats = state.stats;
    let reading = state.reading;
    let set_reading = state.set_reading;

    view! {
        <section class="saved-stories">
            <h2>"Cuentos Guardados"</h2>

            {move || stats.get().map(|s| view! {
                <div class="stats">
                    <span>{format!("{} cuentos", s.total)}</span>
                    <span>{format!("{} palabras en promedio", s.average_words)}</span>
                    <span>{format!("{} culturas", s.distinct_cultures)}</span>
                </div>
            })}

            {move || match reading.get() {
                Some(story) => view! {
                    <article class="saved-reader">
                        <button on:click=move |_| set_reading.set(None)>"Volver a la lista"</button>
                        <h3>{story.title.clone()}</h3>
                        {story.full_text.split("\n\n").map(|p| view! { <p>{p.to_string()}</p> }).collect_view()}
                    </article>
                }.into_any(),
                None => view! { <StoryList stories=stories /> }.into_any(),
            }}
        </section>
    }
}

#[component]
fn StoryList(stories: ReadSignal<Vec<SavedStory>>) -> impl IntoView {
    let state = expect_context::<AppState>();

    view! {
        {move || {
            if stories.get().is_empty() {
                return view! { <div class="empty-state">"Aún no has guardado ningún cuento"</div> }.into_any();
            }
            let state = state.clone();
            view! {
                <For
                    each=move || stories.get()
                    key=|s| s.id.clone()
                    let:story
                >
                    {
                        let state = state.clone();
                        let id = story.id.clone();
                        let set_reading = state.set_reading;
                        let open = story.clone();
                        view! {
                            <div class="saved-item">
                                <div class="saved-title" on:click=move |_| set_reading.set(Some(open.clone()))>
                                    {story.title.clone()}
                                </div>
                                <small>
                                    {format!(
                                        "{} · {} palabras{}",
                                        story.culture,
                                        story.word_count,
                                        if story.is_interactive { " · interactivo" } else { "" },
                                    )}
                                </small>
                                <button
                                    class="delete-btn"
                                    on:click=move |_| {
                                        if confirm("¿Eliminar este cuento?") {
                                            state.delete_story(id.clone());
                                        }
                                    }
                                >
                                    "Eliminar"
                                </button>
                            </div>
                        }
                    }
                </For>
            }.into_any()
        }}
    }
}
