use strum::Display;

/// Kinds of resources a request can refer to. Used to describe missing or conflicting rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ResourceType {
    Page,
    Post,
    Survey,
    User,
}
