use std::str::FromStr;

use anyhow::{Context, anyhow};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::domain::device::models::device::{
    Device, DeviceBrand, DeviceId, DeviceName, DeviceState, NewDevice, SwapOutcome,
};
use crate::domain::device::ports::DeviceRepository;

const DEVICE_COLUMNS: &str = "id, name, brand, state, created_at";

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(path: &str) -> Result<Sqlite, anyhow::Error> {
        let pool = SqlitePool::connect_with(
            SqliteConnectOptions::from_str(path)
                .with_context(|| format!("invalid database path {}", path))?
                .create_if_missing(true),
        )
        .await
        .with_context(|| format!("failed to open database at {}", path))?;

        Self::migrated(pool).await
    }

    /// Private in-memory database. The pool holds a single connection that is never
    /// recycled, since the data lives and dies with it.
    pub async fn in_memory() -> Result<Sqlite, anyhow::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await
            .context("failed to open in-memory database")?;

        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Sqlite, anyhow::Error> {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;

        Ok(Sqlite { pool })
    }
}

impl DeviceRepository for Sqlite {
    async fn create_device(&self, device: &NewDevice) -> Result<Device, anyhow::Error> {
        let id = DeviceId::generate();

        sqlx::query(
            "INSERT INTO devices (id, name, brand, brand_folded, state, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(device.name().as_str())
        .bind(device.brand().as_str())
        .bind(fold_case(device.brand().as_str()))
        .bind(device.state().as_str())
        .bind(device.created_at())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to save device with name {:?}", device.name()))?;

        Ok(device.clone().into_device(id))
    }

    async fn find_device_by_id(&self, id: &DeviceId) -> Result<Option<Device>, anyhow::Error> {
        let row = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to load device {}", id))?;

        row.map(Device::try_from).transpose()
    }

    async fn find_all_devices(&self) -> Result<Vec<Device>, anyhow::Error> {
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .context("failed to load devices")?;

        into_devices(rows)
    }

    async fn find_devices_by_brand(&self, brand: &str) -> Result<Vec<Device>, anyhow::Error> {
        // instr keeps `%` and `_` in the search text literal, unlike LIKE.
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices \
             WHERE instr(brand_folded, ?) > 0 ORDER BY created_at"
        ))
        .bind(fold_case(brand))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load devices with brand {:?}", brand))?;

        into_devices(rows)
    }

    async fn find_devices_by_state(
        &self,
        state: DeviceState,
    ) -> Result<Vec<Device>, anyhow::Error> {
        let rows = sqlx::query_as::<_, DeviceRow>(&format!(
            "SELECT {DEVICE_COLUMNS} FROM devices WHERE state = ? ORDER BY created_at"
        ))
        .bind(state.as_str())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load devices in state {}", state))?;

        into_devices(rows)
    }

    async fn replace_device(
        &self,
        current: &Device,
        updated: &Device,
    ) -> Result<SwapOutcome<Device>, anyhow::Error> {
        if current.id() != updated.id() {
            return Err(anyhow!(
                "cannot replace device {} with device {}",
                current.id(),
                updated.id()
            ));
        }

        let result = sqlx::query(
            "UPDATE devices SET name = ?, brand = ?, brand_folded = ?, state = ? \
             WHERE id = ? AND name = ? AND brand = ? AND state = ?",
        )
        .bind(updated.name().as_str())
        .bind(updated.brand().as_str())
        .bind(fold_case(updated.brand().as_str()))
        .bind(updated.state().as_str())
        .bind(current.id().to_string())
        .bind(current.name().as_str())
        .bind(current.brand().as_str())
        .bind(current.state().as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to update device {}", current.id()))?;

        if result.rows_affected() == 0 {
            Ok(SwapOutcome::Stale)
        } else {
            Ok(SwapOutcome::Swapped(updated.clone()))
        }
    }

    async fn delete_device(&self, current: &Device) -> Result<SwapOutcome<()>, anyhow::Error> {
        let result = sqlx::query(
            "DELETE FROM devices WHERE id = ? AND name = ? AND brand = ? AND state = ?",
        )
        .bind(current.id().to_string())
        .bind(current.name().as_str())
        .bind(current.brand().as_str())
        .bind(current.state().as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to delete device {}", current.id()))?;

        if result.rows_affected() == 0 {
            Ok(SwapOutcome::Stale)
        } else {
            Ok(SwapOutcome::Swapped(()))
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DeviceRow {
    id: String,
    name: String,
    brand: String,
    state: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<DeviceRow> for Device {
    type Error = anyhow::Error;

    fn try_from(row: DeviceRow) -> Result<Self, Self::Error> {
        let context = || format!("corrupt device row {}", row.id);

        Ok(Device::new(
            DeviceId::new(&row.id).with_context(context)?,
            DeviceName::new(&row.name).with_context(context)?,
            DeviceBrand::new(&row.brand).with_context(context)?,
            row.state.parse::<DeviceState>().with_context(context)?,
            row.created_at,
        ))
    }
}

fn into_devices(rows: Vec<DeviceRow>) -> Result<Vec<Device>, anyhow::Error> {
    rows.into_iter().map(Device::try_from).collect()
}

/// SQLite's `lower()` only folds ASCII, so brands are stored and searched pre-folded.
fn fold_case(text: &str) -> String {
    text.to_lowercase()
}
