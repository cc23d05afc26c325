use leptos::prelude::*;
use leptos::ev;

use crate::models::{CultureProfile, StoryRequest};
use crate::state::AppState;

const AUDIENCES: [(&str, &str); 4] = [
    ("6-8", "6-8 años"),
    ("9-12", "9-12 años"),
    ("13-17", "13-17 años"),
    ("18+", "Adultos"),
];

const DURATIONS: [(&str, &str); 3] = [
    ("short", "Corta (3-5 min)"),
    ("medium", "Media (5-8 min)"),
    ("long", "Larga (8-12 min)"),
];

fn preset(index: usize) -> StoryRequest {
    let (culture, story_type, characters, setting, theme, audience_age, duration, branching) =
        match index {
            0 => (
                "mexica",
                "myth",
                "Quetzalcóatl y una joven sacerdotisa llamada Itzel",
                "El gran Teocalli de Tenochtitlan durante el solsticio de verano",
                "El origen del cacao y su importancia sagrada para el pueblo mexica",
                "9-12",
                "medium",
                true,
            ),
            1 => (
                "maya",
                "adventure",
                "Itzamná, dios creador, y un joven escriba maya llamado Akbal",
                "Las selvas del Petén y la ciudad sagrada de Tikal",
                "La búsqueda del conocimiento perdido en los códices ancestrales",
                "13-17",
                "long",
                true,
            ),
            _ => (
                "zapoteca",
                "legend",
                "Pitao Cocijo, señor de la lluvia, y la princesa Donají",
                "Monte Albán y los valles centrales de Oaxaca",
                "El sacrificio heroico para salvar a su pueblo de la sequía",
                "18+",
                "medium",
                false,
            ),
        };
    StoryRequest {
        culture: culture.to_string(),
        story_type: story_type.to_string(),
        characters: characters.to_string(),
        setting: setting.to_string(),
        theme: theme.to_string(),
        audience_age: audience_age.to_string(),
        duration: duration.to_string(),
        branching_enabled: branching,
    }
}

/// Story request form with per-culture suggestions and example presets.
#[component]
pub fn StoryForm() -> impl IntoView {
    let state = expect_context::<AppState>();
    let form = RwSignal::new(StoryRequest::default());
    let reference = state.reference;
    let is_waiting = state.is_waiting;
    let set_error = state.set_error;

    let profile = move || -> Option<CultureProfile> {
        let culture = form.with(|f| f.culture.clone());
        reference.get().and_then(|data| {
            data.cultures.into_iter().find(|p| p.culture == culture)
        })
    };

    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        if is_waiting.get_untracked() {
            return;
        }
        let request = form.get_untracked();
        if [&request.characters, &request.setting, &request.theme]
            .iter()
            .any(|value| value.trim().is_empty())
        {
            set_error.set(Some("Por favor, completa todos los campos obligatorios.".to_string()));
            return;
        }
        state.start_story(request);
    };

    view! {
        <section class="story-form">
            <h2>"Crear Cuento Cultural"</h2>
            <form on:submit=on_submit>
                <div class="form-group">
                    <label>"Cultura"</label>
                    <select
                        prop:value=move || form.with(|f| f.culture.clone())
                        on:change=move |ev| form.update(|f| f.culture = event_target_value(&ev))
                        disabled=is_waiting
                    >
                        {move || {
                            reference.get().map(|data| {
                                data.cultures
                                    .into_iter()
                                    .map(|p| view! { <option value=p.culture.clone()>{p.name}</option> })
                                    .collect_view()
                            })
                        }}
                    </select>
                    {move || profile().map(|p| view! { <p class="culture-description">{p.description}</p> })}
                </div>

                <div class="form-group">
                    <label>"Tipo de historia"</label>
                    <select
                        prop:value=move || form.with(|f| f.story_type.clone())
                        on:change=move |ev| form.update(|f| f.story_type = event_target_value(&ev))
                        disabled=is_waiting
                    >
                        {move || {
                            reference.get().map(|data| {
                                data.story_types
                                    .into_iter()
                                    .map(|t| {
                                        view! { <option value=t.story_type.clone()>{t.description}</option> }
                                    })
                                    .collect_view()
                            })
                        }}
                    </select>
                </div>

                <div class="form-group">
                    <label>"Personajes principales *"</label>
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.characters.clone())
                        on:input=move |ev| form.update(|f| f.characters = event_target_value(&ev))
                        disabled=is_waiting
                    />
                    {move || profile().map(|p| view! {
                        <small class="suggestions">"Personajes sugeridos: " {p.characters.join(", ")}</small>
                    })}
                </div>

                <div class="form-group">
                    <label>"Lugar principal *"</label>
                    <input
                        type="text"
                        prop:value=move || form.with(|f| f.setting.clone())
                        on:input=move |ev| form.update(|f| f.setting = event_target_value(&ev))
                        disabled=is_waiting
                    />
                    {move || profile().map(|p| view! {
                        <small class="suggestions">"Lugares sugeridos: " {p.places.join(", ")}</small>
                    })}
                </div>

                <div class="form-group">
                    <label>"Tema central *"</label>
                    <textarea
                        prop:value=move || form.with(|f| f.theme.clone())
                        on:input=move |ev| form.update(|f| f.theme = event_target_value(&ev))
                        disabled=is_waiting
                    />
                </div>

                <div class="form-row">
                    <select
                        prop:value=move || form.with(|f| f.audience_age.clone())
                        on:change=move |ev| form.update(|f| f.audience_age = event_target_value(&ev))
                        disabled=is_waiting
                    >
                        {AUDIENCES
                            .into_iter()
                            .map(|(value, label)| view! { <option value=value>{label}</option> })
                            .collect_view()}
                    </select>
                    <select
                        prop:value=move || form.with(|f| f.duration.clone())
                        on:change=move |ev| form.update(|f| f.duration = event_target_value(&ev))
                        disabled=is_waiting
                    >
                        {DURATIONS
                            .into_iter()
                            .map(|(value, label)| view! { <option value=value>{label}</option> })
                            .collect_view()}
                    </select>
                    <label class="checkbox">
                        <input
                            type="checkbox"
                            prop:checked=move || form.with(|f| f.branching_enabled)
                            on:change=move |ev| form.update(|f| f.branching_enabled = event_target_checked(&ev))
                            disabled=is_waiting
                        />
                        "Historia interactiva (con decisiones)"
                    </label>
                </div>

                <button type="submit" class="generate-btn" disabled=is_waiting>
                    {move || if is_waiting.get() { "Creando cuento…" } else { "Generar Cuento Cultural" }}
                </button>
            </form>

            <div class="example-buttons">
                <h3>"Ejemplos Culturales"</h3>
                {["Mito Mexica", "Aventura Maya", "Leyenda Zapoteca"]
                    .into_iter()
                    .enumerate()
                    .map(|(i, label)| view! {
                        <button
                            type="button"
                            class="example-btn"
                            disabled=is_waiting
                            on:click=move |_| form.set(preset(i))
                        >
                            {label}
                        </button>
                    })
                    .collect_view()}
            </div>
        </section>
    }
}
