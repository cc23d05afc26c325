mod api;
mod components;
mod models;
mod state;

use leptos::prelude::*;
use leptos::mount::mount_to_body;

use components::saved_stories::SavedStories;
use components::story_form::StoryForm;
use components::story_view::StoryReader;
use state::{AppState, Screen};

/// Root application component.
#[component]
fn App() -> impl IntoView {
    let state = AppState::provide();

    // Load form reference data on mount
    state.load_reference_data();

    let error = state.error;
    let screen = state.screen;
    let open_library = move |_| state.open_library();

    view! {
        <div class="app-container">
            <header class="app-header">
                <h1>"Cuentos de México Ancestral"</h1>
                <button class="library-btn" on:click=open_library>
                    "Ver Cuentos Guardados"
                </button>
            </header>

            // Error banner
            {move || {
                error.get().map(|err| {
                    view! {
                        <div class="error-banner">{err}</div>
                    }
                })
            }}

            {move || match screen.get() {
                Screen::Form => view! { <StoryForm /> }.into_any(),
                Screen::Story => view! { <StoryReader /> }.into_any(),
                Screen::Library => view! { <SavedStories /> }.into_any(),
            }}
        </div>
    }
}

fn main() {
    console_log::init_with_level(log::Level::Debug).expect("Failed to init logger");
    mount_to_body(App);
}
