/// Server-side restriction applied to a mailbox listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    Unread,
    UnreadWithAttachments,
}

pub fn messages_endpoint(mailbox: &str) -> String {
    format!("/api/v2.0/users/{mailbox}/messages")
}

pub fn message_endpoint(mailbox: &str, message_id: &str) -> String {
    format!("/api/v2.0/users/{mailbox}/messages/{message_id}")
}

pub fn attachments_endpoint(mailbox: &str, message_id: &str) -> String {
    format!("/api/v2.0/users/{mailbox}/messages/{message_id}/attachments")
}

pub fn filter_query(filter: ListFilter) -> Option<Vec<(String, String)>> {
    let expression = match filter {
        ListFilter::All => return None,
        ListFilter::Unread => "IsRead ne true",
        ListFilter::UnreadWithAttachments => "IsRead ne true and HasAttachments eq true",
    };

    Some(vec![("$filter".to_string(), expression.to_string())])
}
