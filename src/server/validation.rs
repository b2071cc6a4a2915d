use crate::server::response::ApiError;

const MAX_NAME_LEN: usize = 100;
const MAX_TITLE_LEN: usize = 200;
const MAX_EMAIL_LEN: usize = 254;

fn validate_name(name: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.len() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    Ok(())
}

pub fn validate_user_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "User", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_workspace_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Workspace", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_folder_name(name: &str) -> Result<(), ApiError> {
    validate_name(name, "Folder", MAX_NAME_LEN).map_err(ApiError::bad_request)
}

pub fn validate_file_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let valid = email.len() <= MAX_EMAIL_LEN
        && matches!(email.split_once('@'), Some((local, domain))
            if !local.is_empty() && !domain.is_empty());

    if valid {
        Ok(())
    } else {
        Err(ApiError::bad_request("Email address is not valid"))
    }
}
