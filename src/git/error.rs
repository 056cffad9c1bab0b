//! Turning libgit2 errors into short, readable reasons

use git2::{Error, ErrorClass};

#[derive(Clone, Copy)]
enum Category {
    NotFound,
    Auth,
    PermissionDenied,
    Network,
    Certificate,
}

type Matcher = fn(&str, ErrorClass) -> bool;

const CATEGORIES: &[(Matcher, Category)] = &[
    (
        |msg, _| msg.contains("not found") || msg.contains("404"),
        Category::NotFound,
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        Category::Auth,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        Category::PermissionDenied,
    ),
    (
        |msg, _| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("resolve")
                || msg.contains("timed out")
        },
        Category::Network,
    ),
    (
        |msg, class| {
            class == ErrorClass::Http && (msg.contains("certificate") || msg.contains("ssl"))
        },
        Category::Certificate,
    ),
];

/// Reason text for a failed git operation
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let category = CATEGORIES
        .iter()
        .find(|(matches, _)| matches(&message, err.class()))
        .map(|(_, category)| *category);

    match category {
        Some(Category::NotFound) => "Repository not found".to_string(),
        Some(Category::Auth) => "Authentication failed".to_string(),
        Some(Category::PermissionDenied) => "Permission denied".to_string(),
        Some(Category::Network) => "Network error".to_string(),
        Some(Category::Certificate) => "TLS certificate error".to_string(),
        None => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}
