//! Hive registry seeding

use serde::Deserialize;
use storage::{NewHive, Requester};
use tracing::info;

use crate::pipeline::{IngestError, Ingestor};

fn default_approved() -> bool {
    true
}

/// One hive entry in a seed file
#[derive(Debug, Clone, Deserialize)]
pub struct SeedHive {
    pub name: String,
    pub device_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: i64,
    #[serde(default)]
    pub owner_name: String,
    /// Activate immediately (default true)
    #[serde(default = "default_approved")]
    pub approved: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Register (and optionally approve) each seed hive and its owner's contact
pub fn seed_hives(ingestor: &Ingestor, seeds: Vec<SeedHive>) -> Result<usize, IngestError> {
    let admin = Requester::admin(0);
    let repo = ingestor.repository();
    let count = seeds.len();

    for seed in seeds {
        let hive = repo.register_hive(NewHive {
            name: seed.name,
            device_id: seed.device_id,
            location: seed.location,
            description: seed.description,
            owner_id: seed.owner_id,
            owner_name: seed.owner_name,
        })?;

        if seed.approved {
            repo.approve_hive(hive.id, &admin)?;
        }
        if seed.email.is_some() || seed.phone.is_some() {
            ingestor.register_contact(seed.owner_id, seed.email.as_deref(), seed.phone.as_deref())?;
        }
    }

    info!("Seeded {} hive(s)", count);
    Ok(count)
}
