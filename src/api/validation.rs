use chrono::DateTime;

use super::ApiError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_ACTIVITY_LIMIT: u64 = 50;
pub const MAX_ACTIVITY_LIMIT: u64 = 100;

fn validate_length<'a>(
    field: &str,
    value: &'a str,
    min: usize,
    max: usize,
) -> Result<&'a str, ApiError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(ApiError::validation(if min == 0 {
            format!("{field} must be {max} characters or less")
        } else {
            format!("{field} must be between {min} and {max} characters")
        }));
    }
    Ok(trimmed)
}

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {}. ID must be a positive integer",
            id
        )));
    }
    Ok(id)
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let username = validate_length("Username", username, 3, 20)?;
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ApiError::validation(
            "Username can only contain letters, numbers, dots, hyphens, and underscores",
        ));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    let len = password.chars().count();
    if !(4..=64).contains(&len) {
        return Err(ApiError::validation(
            "Password must be between 4 and 64 characters",
        ));
    }
    Ok(password)
}

/// Name and designation share the same bound. Blank input clears the field.
pub fn validate_profile_field(field: &str, value: Option<&str>) -> Result<Option<String>, ApiError> {
    value
        .map(|v| validate_length(field, v, 0, 100).map(str::to_string))
        .transpose()
}

pub fn validate_task_title(title: &str) -> Result<&str, ApiError> {
    validate_length("Task title", title, 3, 255)
}

pub fn validate_column_title(title: &str) -> Result<&str, ApiError> {
    validate_length("Column title", title, 2, 100)
}

pub fn validate_colors(colors: &str) -> Result<&str, ApiError> {
    validate_length("Colors", colors, 0, 50)
}

pub fn validate_comment(content: &str) -> Result<&str, ApiError> {
    validate_length("Comment", content, 1, 10_000)
}

pub fn validate_checklist_title(title: &str) -> Result<&str, ApiError> {
    validate_length("Checklist title", title, 1, 200)
}

pub fn validate_app_name(name: &str) -> Result<&str, ApiError> {
    validate_length("App name", name, 2, 50)
}

pub fn validate_app_description(description: &str) -> Result<&str, ApiError> {
    validate_length("App description", description, 0, 200)
}

pub fn validate_weight(weight: i32) -> Result<i32, ApiError> {
    if weight < 0 {
        return Err(ApiError::validation("Weight cannot be negative"));
    }
    Ok(weight)
}

/// Due dates and date filters are RFC 3339 timestamps.
pub fn validate_timestamp<'a>(field: &str, value: &'a str) -> Result<&'a str, ApiError> {
    DateTime::parse_from_rfc3339(value).map_err(|_| {
        ApiError::validation(format!("{field} must be an RFC 3339 timestamp"))
    })?;
    Ok(value)
}

pub fn validate_page(page: Option<u64>, limit: Option<u64>) -> Result<(u64, u64), ApiError> {
    let page = page.unwrap_or(1);
    if page == 0 {
        return Err(ApiError::validation("Page must be 1 or greater"));
    }

    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, MAX_PAGE_SIZE
        )));
    }
    Ok((page, limit))
}

pub fn validate_activity_limit(limit: Option<u64>) -> Result<u64, ApiError> {
    let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    if !(1..=MAX_ACTIVITY_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between 1 and {}",
            limit, MAX_ACTIVITY_LIMIT
        )));
    }
    Ok(limit)
}

pub fn validate_search_query(query: &str) -> Result<&str, ApiError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query cannot be empty"));
    }
    Ok(trimmed)
}
