/// Flat-file persistence for appointments and cancellation requests.
///
/// Each collection lives in its own CSV file with a header row and is
/// rewritten in full on every save. Rows that cannot be parsed are dropped
/// on load and counted in the returned snapshot.

use crate::error::{RowError, StoreError};
use crate::models::{parse_datetime, Appointment, CancellationRequest, ClinicDay, DATETIME_FORMAT};
use csv::{ByteRecord, ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the store holds, plus how many stored rows were unusable.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub appointments: Vec<Appointment>,
    pub cancellations: Vec<CancellationRequest>,
    pub dropped_rows: usize,
}

pub trait Store {
    fn load(&self) -> Result<Snapshot, StoreError>;

    fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError>;

    fn save_cancellations(&self, requests: &[CancellationRequest]) -> Result<(), StoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct AppointmentRow {
    day: String,
    datetime: String,
    name: String,
    contact: String,
}

impl AppointmentRow {
    fn into_appointment(self) -> Result<Appointment, RowError> {
        Ok(Appointment {
            day: ClinicDay::from_string(&self.day)?,
            start_time: parse_datetime(&self.datetime)?,
            patient_name: self.name,
            contact: self.contact,
        })
    }
}

impl From<&Appointment> for AppointmentRow {
    fn from(apt: &Appointment) -> Self {
        AppointmentRow {
            day: apt.day.name().to_string(),
            datetime: apt.start_time.format(DATETIME_FORMAT).to_string(),
            name: apt.patient_name.clone(),
            contact: apt.contact.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct CancellationRow<'a> {
    message: &'a str,
}

/// Store backed by two CSV files.
#[derive(Debug, Clone)]
pub struct CsvStore {
    appointments_path: PathBuf,
    cancellations_path: PathBuf,
}

impl CsvStore {
    pub fn new(appointments_path: impl Into<PathBuf>, cancellations_path: impl Into<PathBuf>) -> Self {
        CsvStore {
            appointments_path: appointments_path.into(),
            cancellations_path: cancellations_path.into(),
        }
    }

    fn open(path: &Path) -> Result<Option<File>, StoreError> {
        match File::open(path) {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", path.display());
                Ok(None)
            }
            Err(source) => Err(io_error(path, source)),
        }
    }

    fn load_appointments(&self) -> Result<(Vec<Appointment>, usize), StoreError> {
        let path = &self.appointments_path;
        let Some(file) = Self::open(path)? else {
            return Ok((Vec::new(), 0));
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut appointments = Vec::new();
        let mut dropped = 0;

        for (line, result) in reader.deserialize::<AppointmentRow>().enumerate() {
            let parsed = match result {
                Ok(row) => row.into_appointment(),
                Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
                Err(e) => {
                    warn!("Dropping row {} of {}: {}", line + 1, path.display(), e);
                    dropped += 1;
                    continue;
                }
            };

            match parsed {
                Ok(apt) => appointments.push(apt),
                Err(e) => {
                    warn!("Dropping row {} of {}: {}", line + 1, path.display(), e);
                    dropped += 1;
                }
            }
        }

        Ok((appointments, dropped))
    }

    fn load_cancellations(&self) -> Result<(Vec<CancellationRequest>, usize), StoreError> {
        let path = &self.cancellations_path;
        let Some(file) = Self::open(path)? else {
            return Ok((Vec::new(), 0));
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut requests = Vec::new();
        let mut dropped = 0;
        let mut record = ByteRecord::new();
        let mut line = 0;

        // Only the first column matters; the header name has varied.
        loop {
            line += 1;
            match reader.read_byte_record(&mut record) {
                Ok(false) => break,
                Ok(true) => {}
                Err(e) if e.is_io_error() => return Err(csv_error(path, e)),
                Err(e) => {
                    warn!("Dropping cancellation row {} of {}: {}", line, path.display(), e);
                    dropped += 1;
                    continue;
                }
            }

            let parsed = String::from_utf8(record.get(0).unwrap_or_default().to_vec())
                .map_err(|_| RowError::Encoding)
                .and_then(|message| {
                    CancellationRequest::new(message).map_err(|_| RowError::EmptyMessage)
                });

            match parsed {
                Ok(request) => requests.push(request),
                Err(e) => {
                    warn!("Dropping cancellation row {} of {}: {}", line, path.display(), e);
                    dropped += 1;
                }
            }
        }

        Ok((requests, dropped))
    }
}

impl Store for CsvStore {
    fn load(&self) -> Result<Snapshot, StoreError> {
        let (appointments, dropped_appointments) = self.load_appointments()?;
        let (cancellations, dropped_cancellations) = self.load_cancellations()?;
        let dropped_rows = dropped_appointments + dropped_cancellations;

        info!(
            appointments = appointments.len(),
            cancellations = cancellations.len(),
            dropped_rows,
            "Loaded clinic data"
        );

        Ok(Snapshot {
            appointments,
            cancellations,
            dropped_rows,
        })
    }

    fn save_appointments(&self, appointments: &[Appointment]) -> Result<(), StoreError> {
        let path = &self.appointments_path;
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        if appointments.is_empty() {
            // serde only emits the header alongside the first record
            writer
                .write_record(["day", "datetime", "name", "contact"])
                .map_err(|e| csv_error(path, e))?;
        }
        for apt in appointments {
            writer
                .serialize(AppointmentRow::from(apt))
                .map_err(|e| csv_error(path, e))?;
        }
        writer.flush().map_err(|e| io_error(path, e))?;

        info!("Saved {} appointments to {}", appointments.len(), path.display());
        Ok(())
    }

    fn save_cancellations(&self, requests: &[CancellationRequest]) -> Result<(), StoreError> {
        let path = &self.cancellations_path;
        let mut writer = WriterBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        if requests.is_empty() {
            writer.write_record(["message"]).map_err(|e| csv_error(path, e))?;
        }
        for request in requests {
            writer
                .serialize(CancellationRow {
                    message: request.message(),
                })
                .map_err(|e| csv_error(path, e))?;
        }
        writer.flush().map_err(|e| io_error(path, e))?;

        info!("Saved {} cancellation requests to {}", requests.len(), path.display());
        Ok(())
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn csv_error(path: &Path, source: csv::Error) -> StoreError {
    StoreError::Csv {
        path: path.display().to_string(),
        source,
    }
}
