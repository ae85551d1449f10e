use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{ApplicationStatus, JobApplication, WorkType};

/// Fields for a record that doesn't have an id yet.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub company: String,
    pub position: String,
    pub date_applied: String,
    pub work_type: WorkType,
    pub status: ApplicationStatus,
    pub notes: Option<String>,
}

/// Partial edit; `None` leaves the field alone.
#[derive(Debug, Clone, Default)]
pub struct ApplicationPatch {
    pub company: Option<String>,
    pub position: Option<String>,
    pub date_applied: Option<String>,
    pub work_type: Option<WorkType>,
    pub status: Option<ApplicationStatus>,
    pub notes: Option<Option<String>>,
}

/// Owns the collection. Insertion order is kept and is the order the view
/// falls back on for ties.
#[derive(Debug, Clone, Default)]
pub struct ApplicationStore {
    applications: Vec<JobApplication>,
}

impl ApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_applications(applications: Vec<JobApplication>) -> Result<Self, StoreError> {
        let mut seen = HashSet::new();
        for app in &applications {
            if !seen.insert(app.id.as_str()) {
                return Err(StoreError::DuplicateId(app.id.clone()));
            }
        }
        Ok(Self { applications })
    }

    /// Reads a snapshot. A missing file is an empty collection.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot yet, starting empty");
            return Ok(Self::new());
        }
        let raw = fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let applications: Vec<JobApplication> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        info!(path = %path.display(), count = applications.len(), "loaded applications");
        Self::from_applications(applications)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.applications).map_err(|source| {
            StoreError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        fs::write(path, json).map_err(io_err)?;
        debug!(path = %path.display(), count = self.applications.len(), "saved applications");
        Ok(())
    }

    pub fn all(&self) -> &[JobApplication] {
        &self.applications
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&JobApplication> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn add(&mut self, new: NewApplication) -> Result<String, StoreError> {
        let company = require("company", new.company)?;
        let position = require("position", new.position)?;
        let id = self.next_id();

        self.applications.push(JobApplication {
            id: id.clone(),
            company,
            position,
            date_applied: new.date_applied,
            work_type: new.work_type,
            status: new.status,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
        });
        info!(%id, "added application");
        Ok(id)
    }

    pub fn update(&mut self, id: &str, patch: ApplicationPatch) -> Result<&JobApplication, StoreError> {
        // Validate before touching the record so a rejected edit changes nothing.
        let company = patch.company.map(|c| require("company", c)).transpose()?;
        let position = patch.position.map(|p| require("position", p)).transpose()?;

        let app = self
            .applications
            .iter_mut()
            .find(|app| app.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if let Some(company) = company {
            app.company = company;
        }
        if let Some(position) = position {
            app.position = position;
        }
        if let Some(date) = patch.date_applied {
            app.date_applied = date;
        }
        if let Some(work_type) = patch.work_type {
            app.work_type = work_type;
        }
        if let Some(status) = patch.status {
            app.status = status;
        }
        if let Some(notes) = patch.notes {
            app.notes = notes.filter(|n| !n.trim().is_empty());
        }
        info!(%id, "updated application");
        Ok(&*app)
    }

    pub fn remove(&mut self, id: &str) -> Result<JobApplication, StoreError> {
        let idx = self
            .applications
            .iter()
            .position(|app| app.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        info!(%id, "removed application");
        Ok(self.applications.remove(idx))
    }

    /// One past the largest numeric id, skipping anything already taken.
    fn next_id(&self) -> String {
        let mut next = self
            .applications
            .iter()
            .filter_map(|app| app.id.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        while self.get(&next.to_string()).is_some() {
            next += 1;
        }
        next.to_string()
    }

    /// The sample records the dashboard shipped with.
    pub fn seed_demo() -> Self {
        let rows = [
            ("Tech Solutions Inc.", "Frontend Developer", "2023-05-15", WorkType::Remote, ApplicationStatus::Interview),
            ("Global Systems", "Full Stack Engineer", "2023-05-10", WorkType::Hybrid, ApplicationStatus::Applied),
            ("Innovative Software", "UI/UX Designer", "2023-05-05", WorkType::OnSite, ApplicationStatus::Rejected),
            ("Digital Platforms", "Backend Developer", "2023-05-01", WorkType::Remote, ApplicationStatus::Offer),
            ("Creative Solutions", "Product Manager", "2023-04-28", WorkType::Hybrid, ApplicationStatus::Applied),
        ];
        let applications = rows
            .into_iter()
            .enumerate()
            .map(|(i, (company, position, date, work_type, status))| JobApplication {
                id: (i + 1).to_string(),
                company: company.to_string(),
                position: position.to_string(),
                date_applied: date.to_string(),
                work_type,
                status,
                notes: None,
            })
            .collect();
        Self { applications }
    }
}

fn require(field: &'static str, value: String) -> Result<String, StoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(StoreError::BlankField(field));
    }
    Ok(trimmed.to_string())
}
