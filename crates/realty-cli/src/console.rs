//! Terminal collaborators for the engine

use realty_workflow::{NoticeLevel, Navigator, Notifier, Outcome};

/// Prints notices; errors go to stderr
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => eprintln!("error: {message}"),
            NoticeLevel::Success | NoticeLevel::Info => println!("{message}"),
        }
    }
}

/// Prints the path of every opened view
#[derive(Debug, Clone, Default)]
pub(crate) struct ConsoleNavigator {
    opened: usize,
}

impl ConsoleNavigator {
    pub(crate) fn opened(&self) -> usize {
        self.opened
    }
}

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, path: &str) {
        self.opened += 1;
        println!("open {path}");
    }
}

/// One line describing what a mutation did
pub(crate) fn describe(outcome: &Outcome, action: &str) -> String {
    match outcome {
        Outcome::Applied => action.to_string(),
        Outcome::Unchanged => format!("{action} (no change)"),
        Outcome::Skipped(e) => format!("skipped: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_catalog::WorkflowCategory;
    use realty_workflow::WorkflowError;

    #[test]
    fn test_describe() {
        assert_eq!(describe(&Outcome::Applied, "completed A"), "completed A");
        assert_eq!(describe(&Outcome::Unchanged, "completed A"), "completed A (no change)");

        let skipped = Outcome::Skipped(WorkflowError::UnknownCategory(WorkflowCategory::Tax));
        assert!(describe(&skipped, "completed A").starts_with("skipped: "));
    }

    #[test]
    fn test_navigator_counts_views() {
        let mut nav = ConsoleNavigator::default();
        nav.navigate("/workflows/tax/summary");
        assert_eq!(nav.opened(), 1);
    }
}
