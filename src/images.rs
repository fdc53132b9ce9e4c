use crate::view::{ImageLoader, ImageSource, SurfaceId};
use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceImage {
    Placeholder,
    Loaded { url: String, bytes: usize },
}

#[derive(Debug)]
struct Slot {
    generation: u64,
    image: SurfaceImage,
}

type Surfaces = Arc<Mutex<HashMap<SurfaceId, Slot>>>;

pub struct PosterLoader {
    client: Client,
    surfaces: Surfaces,
    tasks: Mutex<HashMap<SurfaceId, JoinHandle<()>>>,
}

impl PosterLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build poster HTTP client")?;
        Ok(Self {
            client,
            surfaces: Arc::new(Mutex::new(HashMap::new())),
            tasks: Mutex::new(HashMap::new()),
        })
    }

    pub fn image(&self, surface: SurfaceId) -> Option<SurfaceImage> {
        self.surfaces
            .lock()
            .ok()
            .and_then(|s| s.get(&surface).map(|slot| slot.image.clone()))
    }

    // Resets the surface to the placeholder and returns the generation a fetch must match.
    fn begin(&self, surface: SurfaceId) -> u64 {
        let Ok(mut guard) = self.surfaces.lock() else {
            return 0;
        };
        let slot = guard.entry(surface).or_insert(Slot {
            generation: 0,
            image: SurfaceImage::Placeholder,
        });
        slot.generation += 1;
        slot.image = SurfaceImage::Placeholder;
        slot.generation
    }

    // Abort only lands at an await, so a fetch past its last await can still get here
    // after the surface was re-targeted. The generation check drops that result.
    fn finish(surfaces: &Surfaces, surface: SurfaceId, generation: u64, image: SurfaceImage) -> bool {
        let Ok(mut guard) = surfaces.lock() else {
            return false;
        };
        match guard.get_mut(&surface) {
            Some(slot) if slot.generation == generation => {
                slot.image = image;
                true
            }
            _ => false,
        }
    }
}

impl ImageLoader for PosterLoader {
    fn load(&self, surface: SurfaceId, source: ImageSource) {
        let Ok(mut tasks) = self.tasks.lock() else {
            return;
        };
        if let Some(previous) = tasks.remove(&surface) {
            previous.abort();
        }
        let generation = self.begin(surface);

        let ImageSource::Url(url) = source else {
            return;
        };
        let client = self.client.clone();
        let surfaces = Arc::clone(&self.surfaces);
        let handle = tokio::spawn(async move {
            match fetch_bytes(&client, &url).await {
                Ok(bytes) => {
                    let image = SurfaceImage::Loaded {
                        url: url.clone(),
                        bytes,
                    };
                    if Self::finish(&surfaces, surface, generation, image) {
                        debug!("Poster {} loaded into surface {:?} ({} bytes)", url, surface, bytes);
                    } else {
                        debug!("Poster {} arrived after surface {:?} was reused", url, surface);
                    }
                }
                Err(e) => warn!("Poster {} failed to load: {:#}", url, e),
            }
        });
        tasks.insert(surface, handle);
    }
}

async fn fetch_bytes(client: &Client, url: &str) -> Result<usize> {
    let res = client.get(url).send().await.context("poster request failed")?;
    let status = res.status();
    if !status.is_success() {
        return Err(anyhow!("{} -> {}", url, status));
    }
    let bytes = res.bytes().await.context("reading poster failed")?;
    Ok(bytes.len())
}
