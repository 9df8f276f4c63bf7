/// Whether an HTML checkbox was ticked. Browsers omit unticked boxes
/// entirely, so a missing value means `false`.
pub fn checkbox_checked(value: Option<&str>) -> bool {
    match value {
        Some(v) => matches!(v.trim().to_lowercase().as_str(), "on" | "true" | "1" | "yes"),
        None => false,
    }
}
