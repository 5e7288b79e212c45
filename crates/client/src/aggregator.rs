//! Per-image detail fan-out for a page of image summaries.
//!
//! Images with detections get a `GET /images/{id}` each; images without
//! get an empty detail and no request. Results come back in page order,
//! whatever order the responses arrive in. A failed detail fetch degrades
//! to an empty detail for that image only; nothing is retried.
//!
//! At most `concurrency` detail requests are in flight at once. The default
//! equals the results page size, so a full page fans out in one go; lower
//! it if pages grow.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use skyscan_core::models::{Image, ImageDetail};

use crate::backend::DetectionBackend;

pub struct DetailAggregator {
    backend: Arc<dyn DetectionBackend>,
    concurrency: usize,
}

impl DetailAggregator {
    pub fn new(backend: Arc<dyn DetectionBackend>, concurrency: usize) -> Self {
        Self {
            backend,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Detail for every image in `images`, in the same order.
    pub async fn aggregate(&self, images: Vec<Image>) -> Vec<ImageDetail> {
        stream::iter(images)
            .map(|image| self.detail_for(image))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    async fn detail_for(&self, image: Image) -> ImageDetail {
        if !image.has_detections() {
            return ImageDetail::empty(image);
        }

        match self.backend.get_image_detail(image.id).await {
            Ok(detail) => {
                if !detail.detection_count_matches()
                    || detail.image.detection_count != image.detection_count
                {
                    tracing::warn!(
                        image_id = image.id,
                        expected = image.detection_count,
                        received = detail.detections.len(),
                        "Detection count differs from image summary",
                    );
                }
                for detection in detail.detections.iter().filter(|d| !d.bounding_box.is_valid()) {
                    tracing::warn!(
                        image_id = image.id,
                        detection_id = detection.id,
                        "Detection has an invalid bounding box",
                    );
                }
                detail
            }
            Err(e) => {
                tracing::warn!(
                    image_id = image.id,
                    error = %e,
                    "Image detail fetch failed, showing image without detections",
                );
                ImageDetail::empty(image)
            }
        }
    }
}
