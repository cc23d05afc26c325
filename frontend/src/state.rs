use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::models::{ReferenceData, SavedStory, StoryRequest, StoryStats, StoryView};

const SAVE_NOTICE_MS: u32 = 4_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Form,
    Story,
    Library,
}

/// Shared application state, provided via Leptos context.
#[derive(Clone)]
pub struct AppState {
    // --- Read signals (for components to subscribe to) ---
    pub screen: ReadSignal<Screen>,
    pub reference: ReadSignal<Option<ReferenceData>>,
    pub story: ReadSignal<Option<StoryView>>,
    pub is_waiting: ReadSignal<bool>,
    pub error: ReadSignal<Option<String>>,
    pub stories: ReadSignal<Vec<SavedStory>>,
    pub stats: ReadSignal<Option<StoryStats>>,
    pub reading: ReadSignal<Option<SavedStory>>,
    pub save_notice: ReadSignal<Option<String>>,
    /// Bumped whenever the reader starts or leaves a story; responses
    /// carrying an older value belong to a story nobody is looking at.
    start_seq: ReadSignal<u32>,

    // --- Write signals (for mutating state) ---
    pub set_screen: WriteSignal<Screen>,
    pub set_reference: WriteSignal<Option<ReferenceData>>,
    pub set_story: WriteSignal<Option<StoryView>>,
    pub set_is_waiting: WriteSignal<bool>,
    pub set_error: WriteSignal<Option<String>>,
    pub set_stories: WriteSignal<Vec<SavedStory>>,
    pub set_stats: WriteSignal<Option<StoryStats>>,
    pub set_reading: WriteSignal<Option<SavedStory>>,
    pub set_save_notice: WriteSignal<Option<String>>,
    set_start_seq: WriteSignal<u32>,
}

impl AppState {
    /// Create a new `AppState` and provide it in the current Leptos context.
    pub fn provide() -> Self {
        let (screen, set_screen) = signal(Screen::Form);
        let (reference, set_reference) = signal(None::<ReferenceData>);
        let (story, set_story) = signal(None::<StoryView>);
        let (is_waiting, set_is_waiting) = signal(false);
        let (error, set_error) = signal(None::<String>);
        let (stories, set_stories) = signal(Vec::<SavedStory>::new());
        let (stats, set_stats) = signal(None::<StoryStats>);
        let (reading, set_reading) = signal(None::<SavedStory>);
        let (save_notice, set_save_notice) = signal(None::<String>);
        let (start_seq, set_start_seq) = signal(0u32);

        let state = Self {
            screen,
            reference,
            story,
            is_waiting,
            error,
            stories,
            stats,
            reading,
            save_notice,
            start_seq,
            set_screen,
            set_reference,
            set_story,
            set_is_waiting,
            set_error,
            set_stories,
            set_stats,
            set_reading,
            set_save_notice,
            set_start_seq,
        };

        provide_context(state.clone());
        state
    }

    fn active_session(&self) -> Option<String> {
        self.story.get_untracked().map(|view| view.session_id)
    }

    /// Load cultures and story types for the form.
    pub fn load_reference_data(&self) {
        let state = self.clone();
        spawn_local(async move {
            match api::fetch_reference_data().await {
                Ok(data) => state.set_reference.set(Some(data)),
                Err(e) => {
                    log::error!("Failed to fetch reference data: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }

    /// Generate the first chapter and switch to the story screen.
    pub fn start_story(&self, request: StoryRequest) {
        let state = self.clone();
        let seq = self.start_seq.get_untracked().wrapping_add(1);
        self.set_start_seq.set(seq);
        self.set_is_waiting.set(true);
        self.set_error.set(None);
        self.set_save_notice.set(None);

        spawn_local(async move {
            let result = api::start_story(&request).await;
            if state.start_seq.get_untracked() != seq {
                // The reader walked away while the first chapter was being written.
                if let Ok(view) = result {
                    if let Err(e) = api::abandon(&view.session_id).await {
                        log::warn!("Failed to abandon story {}: {e}", view.session_id);
                    }
                }
                return;
            }
            state.set_is_waiting.set(false);
            match result {
                Ok(view) => {
                    state.set_story.set(Some(view));
                    state.set_screen.set(Screen::Story);
                }
                Err(e) => {
                    log::error!("Failed to start story: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }

    /// Submit a choice for the active story.
    pub fn choose(&self, label: String) {
        let Some(session_id) = self.active_session() else {
            return;
        };
        if self.is_waiting.get_untracked() {
            return;
        }
        let state = self.clone();
        self.set_is_waiting.set(true);
        self.set_error.set(None);
        self.set_story.update(|view| {
            if let Some(view) = view {
                view.pending = true;
                view.options.clear();
            }
        });

        spawn_local(async move {
            let result = api::choose(&session_id, &label).await;
            if state.active_session().as_deref() != Some(session_id.as_str()) {
                log::debug!("Dropping continuation for inactive story {session_id}");
                return;
            }
            state.set_is_waiting.set(false);
            match result {
                Ok(view) => state.set_story.set(Some(view)),
                Err(e) => {
                    log::error!("Failed to continue story: {e}");
                    state.set_error.set(Some(e));
                    state.refresh_story(session_id);
                }
            }
        });
    }

    fn refresh_story(&self, session_id: String) {
        let state = self.clone();
        spawn_local(async move {
            // Resync after a rejected choice.
            if let Ok(view) = api::fetch_session(&session_id).await {
                if state.active_session().as_deref() == Some(session_id.as_str()) {
                    state.set_story.set(Some(view));
                }
            }
        });
    }

    /// Leave the current story (new story, back, or library) and drop it server-side.
    pub fn leave_story(&self) {
        self.set_start_seq.update(|seq| *seq = seq.wrapping_add(1));
        self.set_is_waiting.set(false);
        self.set_save_notice.set(None);
        self.set_error.set(None);
        if let Some(session_id) = self.active_session() {
            self.set_story.set(None);
            spawn_local(async move {
                if let Err(e) = api::abandon(&session_id).await {
                    log::warn!("Failed to abandon story {session_id}: {e}");
                }
            });
        }
        self.set_screen.set(Screen::Form);
    }

    /// Persist the active story as read so far.
    pub fn save_story(&self, title: Option<String>) {
        let Some(session_id) = self.active_session() else {
            return;
        };
        let state = self.clone();
        spawn_local(async move {
            match api::save_session(&session_id, title).await {
                Ok(saved) => {
                    state.set_save_notice.set(Some(format!("Cuento guardado: {}", saved.title)));
                    let set_notice = state.set_save_notice;
                    Timeout::new(SAVE_NOTICE_MS, move || set_notice.set(None)).forget();
                }
                Err(e) => {
                    log::error!("Failed to save story: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }

    /// Show the saved stories together with their statistics.
    pub fn open_library(&self) {
        self.leave_story();
        self.set_reading.set(None);
        self.set_screen.set(Screen::Library);
        self.load_library();
    }

    pub fn load_library(&self) {
        let state = self.clone();
        spawn_local(async move {
            match api::fetch_stories().await {
                Ok(stories) => state.set_stories.set(stories),
                Err(e) => {
                    log::error!("Failed to fetch stories: {e}");
                    state.set_error.set(Some(e));
                }
            }
            match api::fetch_stats().await {
                Ok(stats) => state.set_stats.set(Some(stats)),
                Err(e) => log::error!("Failed to fetch stats: {e}"),
            }
        });
    }

    pub fn delete_story(&self, id: String) {
        let state = self.clone();
        spawn_local(async move {
            match api::delete_story(&id).await {
                Ok(()) => {
                    if state.reading.get_untracked().is_some_and(|s| s.id == id) {
                        state.set_reading.set(None);
                    }
                    state.load_library();
                }
                Err(e) => {
                    log::error!("Failed to delete story {id}: {e}");
                    state.set_error.set(Some(e));
                }
            }
        });
    }
}
