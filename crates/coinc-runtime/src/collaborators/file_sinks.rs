use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use coinc_core::{Alert, AlertPublisher, Observation, ObservationStorage, PublishError, StorageError};

/// Appends outbound alerts as JSON Lines to a file.
pub struct FileAlertPublisher {
    writer: Mutex<BufWriter<File>>,
}

impl FileAlertPublisher {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        Ok(Self { writer: Mutex::new(BufWriter::new(file)) })
    }
}

#[async_trait]
impl AlertPublisher for FileAlertPublisher {
    async fn publish(&self, alert: &Alert) -> Result<(), PublishError> {
        let json = serde_json::to_string(alert).map_err(|e| PublishError(e.to_string()))?;
        let mut w = self.writer.lock().expect("alert publisher lock poisoned");
        w.write_all(json.as_bytes()).map_err(|e| PublishError(e.to_string()))?;
        w.write_all(b"\n").map_err(|e| PublishError(e.to_string()))?;
        w.flush().map_err(|e| PublishError(e.to_string()))?;
        Ok(())
    }
}

/// Appends raw observations as JSON Lines to a file, for audit purposes.
/// Not transactional with alert publication.
pub struct FileObservationStorage {
    writer: Mutex<BufWriter<File>>,
}

impl FileObservationStorage {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        Ok(Self { writer: Mutex::new(BufWriter::new(file)) })
    }
}

#[async_trait]
impl ObservationStorage for FileObservationStorage {
    async fn insert(&self, observation: &Observation) -> Result<(), StorageError> {
        let json = serde_json::to_string(observation).map_err(|e| StorageError(e.to_string()))?;
        let mut w = self.writer.lock().expect("observation storage lock poisoned");
        w.write_all(json.as_bytes()).map_err(|e| StorageError(e.to_string()))?;
        w.write_all(b"\n").map_err(|e| StorageError(e.to_string()))?;
        w.flush().map_err(|e| StorageError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coinc_core::AlertKind;
    use std::io::Read;

    fn sample_alert() -> Alert {
        Alert {
            sub_list_num: 0,
            detector_names: vec!["X".into(), "Y".into()],
            neutrino_times: vec![Utc::now(), Utc::now()],
            p_vals: vec![0.5, 0.4],
            p_val_avg: 0.45,
            false_alarm_prob: 0.0,
            server_tag: "test".into(),
            alert_type: AlertKind::CoincMsg,
        }
    }

    fn sample_observation() -> Observation {
        Observation {
            id: "A".into(),
            detector_name: "X".into(),
            neutrino_time: Utc::now(),
            machine_time: None,
            received_time: Some(Utc::now()),
            p_val: 0.5,
            meta: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn alert_publisher_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.jsonl");

        let sink = FileAlertPublisher::open(&path).unwrap();
        sink.publish(&sample_alert()).await.unwrap();
        let mut alert2 = sample_alert();
        alert2.alert_type = AlertKind::Update;
        sink.publish(&alert2).await.unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        let lines: Vec<&str> = contents.trim().split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"alert_type\":\"COINC_MSG\""));
        assert!(lines[1].contains("\"alert_type\":\"UPDATE\""));
    }

    #[tokio::test]
    async fn observation_storage_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.jsonl");

        let storage = FileObservationStorage::open(&path).unwrap();
        storage.insert(&sample_observation()).await.unwrap();

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents.trim().split('\n').count(), 1);
        assert!(contents.contains("\"detector_name\":\"X\""));
    }
}
