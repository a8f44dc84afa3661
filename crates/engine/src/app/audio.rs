use tracing::debug;

/// Audio backend seam. Sound names are opaque asset keys.
pub trait Speaker {
    fn play_sound(&self, name: &str);
    fn play_music(&self, name: &str);
    fn stop_music(&self);
}

/// Records play requests in the log instead of producing sound.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn play_sound(&self, name: &str) {
        debug!(sound = name, "sound_played");
    }

    fn play_music(&self, name: &str) {
        debug!(music = name, "music_started");
    }

    fn stop_music(&self) {
        debug!("music_stopped");
    }
}

#[cfg(test)]
pub(crate) mod recording {
    use std::cell::RefCell;

    use super::Speaker;

    /// Speaker that remembers every request, for assertions.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingSpeaker {
        pub(crate) events: RefCell<Vec<String>>,
    }

    impl RecordingSpeaker {
        pub(crate) fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }
    }

    impl Speaker for RecordingSpeaker {
        fn play_sound(&self, name: &str) {
            self.events.borrow_mut().push(format!("sound:{name}"));
        }

        fn play_music(&self, name: &str) {
            self.events.borrow_mut().push(format!("music:{name}"));
        }

        fn stop_music(&self) {
            self.events.borrow_mut().push("music_stop".to_string());
        }
    }
}
