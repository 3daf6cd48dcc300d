/// Edge emitted when page visibility flips.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LifecycleTransition {
    Paused,
    Resumed,
}

/// Binary run gate driven by page visibility / viewport intersection.
///
/// Paused means: no frame advances, no frame-rate sampling, pointer
/// listeners detached. It is not a quality tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecyclePauser {
    paused: bool,
    listeners_attached: bool,
}

impl Default for LifecyclePauser {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecyclePauser {
    pub fn new() -> Self {
        Self {
            paused: false,
            listeners_attached: true,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pointer_listeners_attached(&self) -> bool {
        self.listeners_attached
    }

    /// Repeated signals with the same visibility are ignored.
    pub fn on_visibility_change(&mut self, visible: bool) -> Option<LifecycleTransition> {
        match (visible, self.paused) {
            (false, false) => {
                self.paused = true;
                self.listeners_attached = false;
                tracing::debug!("globe hidden, pausing frame loop");
                Some(LifecycleTransition::Paused)
            }
            (true, true) => {
                self.paused = false;
                self.listeners_attached = true;
                tracing::debug!("globe visible, resuming frame loop");
                Some(LifecycleTransition::Resumed)
            }
            _ => None,
        }
    }

    /// Permanently detaches; used on teardown.
    pub fn shutdown(&mut self) {
        self.paused = true;
        self.listeners_attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::{LifecyclePauser, LifecycleTransition};

    #[test]
    fn transitions_are_edge_triggered() {
        let mut p = LifecyclePauser::new();
        assert_eq!(p.on_visibility_change(true), None);
        assert_eq!(p.on_visibility_change(false), Some(LifecycleTransition::Paused));
        assert!(p.is_paused());
        assert!(!p.pointer_listeners_attached());
        assert_eq!(p.on_visibility_change(false), None);
        assert_eq!(p.on_visibility_change(true), Some(LifecycleTransition::Resumed));
        assert!(!p.is_paused());
        assert!(p.pointer_listeners_attached());
    }
}
