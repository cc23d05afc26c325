pub mod saved_stories;
pub mod story_form;
pub mod story_view;
