//! Per-container outcome of one update-cycle step.

#[derive(Debug, Clone)]
pub struct UpdateResult {
    pub container_id: String,
    pub container_name: String,
    pub old_image_id: String,
    pub new_image_id: String,
    pub updated: bool,
    pub error: Option<String>,
}

impl UpdateResult {
    pub fn unchanged(container_id: String, container_name: String, image_id: String) -> Self {
        Self {
            container_id,
            container_name,
            old_image_id: image_id.clone(),
            new_image_id: image_id,
            updated: false,
            error: None,
        }
    }

    pub fn failed(container_id: String, container_name: String, image_id: String, error: impl ToString) -> Self {
        Self {
            container_id,
            container_name,
            old_image_id: image_id.clone(),
            new_image_id: image_id,
            updated: false,
            error: Some(error.to_string()),
        }
    }

    pub fn updated(container_id: String, container_name: String, old_image_id: String, new_image_id: String) -> Self {
        Self {
            container_id,
            container_name,
            old_image_id,
            new_image_id,
            updated: true,
            error: None,
        }
    }
}
