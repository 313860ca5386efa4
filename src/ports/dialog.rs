/// User dialog port traits
///
/// Blocking confirmation and error notification, injected so the controller
/// can be driven by a terminal, a GUI or a test double.

/// Asks the user to confirm a destructive action
#[cfg_attr(test, mockall::automock)]
pub trait ConfirmPort: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Shows a user-visible error
#[cfg_attr(test, mockall::automock)]
pub trait NotifierPort: Send + Sync {
    fn notify_error(&self, message: &str);
}
