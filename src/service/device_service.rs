//! Device registry: register, look up by uid, list.

use std::sync::Arc;

use super::normalize;
use crate::domain::{Device, NewDevice};
use crate::error::PinpointError;
use crate::persistence::OfferStore;

/// Device registration and lookup over the [`OfferStore`].
#[derive(Debug, Clone)]
pub struct DeviceService {
    store: Arc<dyn OfferStore>,
}

impl DeviceService {
    /// Creates a new `DeviceService`.
    #[must_use]
    pub fn new(store: Arc<dyn OfferStore>) -> Self {
        Self { store }
    }

    /// Registers a device.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::InvalidArgument`] if the uid is blank, or
    /// [`PinpointError::DeviceAlreadyRegistered`] if it is taken.
    pub async fn register_device(&self, mut device: NewDevice) -> Result<Device, PinpointError> {
        device.uid = device.uid.trim().to_string();
        if device.uid.is_empty() {
            return Err(PinpointError::invalid("uid is required"));
        }
        device.phone_number = normalize(device.phone_number);

        let stored = self.store.insert_device(device).await?;
        tracing::info!(
            uid = %stored.uid,
            status = %stored.status,
            positioned = stored.position.is_some(),
            "device registered"
        );
        Ok(stored)
    }

    /// Fetches a device by uid.
    ///
    /// # Errors
    ///
    /// Returns [`PinpointError::DeviceNotFound`] if no device has that uid.
    pub async fn get_device(&self, uid: &str) -> Result<Device, PinpointError> {
        self.store.get_device(uid.trim()).await
    }

    /// Every registered device, newest first.
    ///
    /// # Errors
    ///
    /// Returns the store's error on failure.
    pub async fn list_devices(&self) -> Result<Vec<Device>, PinpointError> {
        self.store.list_devices().await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::ConnectionStatus;
    use crate::persistence::InMemoryStore;

    fn make_service() -> DeviceService {
        DeviceService::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn register_trims_uid_and_defaults_status() {
        let service = make_service();
        let Ok(device) = service
            .register_device(NewDevice {
                uid: "  dev-1 ".to_string(),
                phone_number: Some(" ".to_string()),
                ..NewDevice::default()
            })
            .await
        else {
            panic!("registration failed");
        };
        assert_eq!(device.uid, "dev-1");
        assert!(device.phone_number.is_none());
        assert_eq!(device.status, ConnectionStatus::NotConnected);

        let Ok(fetched) = service.get_device(" dev-1").await else {
            panic!("lookup failed");
        };
        assert_eq!(fetched.id, device.id);
    }

    #[tokio::test]
    async fn blank_uid_is_rejected() {
        let service = make_service();
        let result = service.register_device(NewDevice::default()).await;
        assert!(matches!(result, Err(PinpointError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let service = make_service();
        for uid in ["a", "b", "c"] {
            let Ok(_) = service
                .register_device(NewDevice {
                    uid: uid.to_string(),
                    ..NewDevice::default()
                })
                .await
            else {
                panic!("registration failed");
            };
        }
        let Ok(devices) = service.list_devices().await else {
            panic!("list failed");
        };
        let uids: Vec<&str> = devices.iter().map(|d| d.uid.as_str()).collect();
        assert_eq!(uids, vec!["c", "b", "a"]);
    }
}
