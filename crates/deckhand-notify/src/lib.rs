//! Deployment notifications for deckhand.
//!
//! Commit and release metadata come from the GitHub REST API; the message is
//! laid out with Slack Block Kit and posted through `chat.postMessage`.

pub mod github;
pub mod message;
pub mod notifier;
pub mod slack;

pub use github::{GitHubClient, GitHubError, SourceControl};
pub use notifier::SlackNotifier;
pub use slack::{MessagePublisher, SlackClient, SlackError};
