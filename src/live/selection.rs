use crate::tracking::AircraftId;

#[derive(Debug, Default)]
pub struct Selection {
    selected: Option<AircraftId>,
}

impl Selection {
    pub fn selected(&self) -> Option<&AircraftId> {
        self.selected.as_ref()
    }

    /// `None` clears the selection. Returns true if it changed.
    pub fn notify_selected(&mut self, id: Option<AircraftId>) -> bool {
        if self.selected == id {
            return false;
        }
        match &id {
            Some(id) => log::debug!("selected {}", id),
            None => log::debug!("selection cleared"),
        }
        self.selected = id;
        true
    }

    pub fn clear_evicted(&mut self, evicted: &[AircraftId]) {
        if self.selected.as_ref().is_some_and(|s| evicted.contains(s)) {
            self.notify_selected(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_and_clear() {
        let mut selection = Selection::default();
        assert!(selection.notify_selected(Some(AircraftId::new("A1"))));
        assert!(!selection.notify_selected(Some(AircraftId::new("A1"))));
        assert_eq!(selection.selected(), Some(&AircraftId::new("A1")));

        selection.clear_evicted(&[AircraftId::new("B2")]);
        assert!(selection.selected().is_some());

        selection.clear_evicted(&[AircraftId::new("B2"), AircraftId::new("A1")]);
        assert!(selection.selected().is_none());
    }
}
