//! Post creation at the user's location.

use chrono::Utc;
use foundation::math::LatLng;
use posts::{NewPost, Post};
use store::{ImageUpload, PostStore, ValidationError};
use tracing::info;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy)]
pub struct PostComposer {
    location: LatLng,
}

impl PostComposer {
    pub fn new(location: LatLng) -> Self {
        Self { location }
    }

    /// A composer for a session's located user; fails when the location is unknown.
    pub fn at(location: Option<LatLng>) -> Result<Self, ClientError> {
        location
            .map(Self::new)
            .ok_or_else(|| ClientError::Geolocation("posting requires a known location".into()))
    }

    pub fn location(&self) -> LatLng {
        self.location
    }

    /// Checks the form before anything is sent.
    pub fn validate(text: &str, image: Option<&ImageUpload>) -> Result<(), ValidationError> {
        let Some(image) = image else {
            return Err(ValidationError::MissingImage);
        };
        if text.trim().is_empty() {
            return Err(ValidationError::MissingImage);
        }
        image.validate()
    }

    /// Uploads the image, then creates the post with zero views.
    ///
    /// The caller refreshes the map once this returns `Ok`.
    pub async fn submit(
        &self,
        store: &dyn PostStore,
        text: &str,
        image: Option<ImageUpload>,
    ) -> Result<Post, ClientError> {
        Self::validate(text, image.as_ref())?;
        let Some(image) = image else {
            return Err(ValidationError::MissingImage.into());
        };

        let file_name = image.storage_name(Utc::now().timestamp_millis());
        info!(%file_name, bytes = image.bytes.len(), "uploading image");
        let image_url = store
            .upload_image(image.bytes, file_name, image.content_type)
            .await
            .map_err(ClientError::Mutation)?;

        let post = store
            .create_post(NewPost::new(text, image_url, self.location))
            .await
            .map_err(ClientError::Mutation)?;
        info!(post = %post.id, "post created");
        Ok(post)
    }
}
