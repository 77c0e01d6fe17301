//! Console state and event handling
//!
//! All network work runs on spawned tasks that report back through the
//! [`AppEvent`] channel; the UI loop applies results between frames.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;

use super::forms::{FieldId, Form, FormAction, FormKind};
use super::widgets::{ListState, TextInputField};
use crate::api::{ClientSettings, Collection, Device, InventoryApi, InventoryClient, IpAddress, Prefix, Vlan};
use crate::api::client::decode_records;
use crate::config::Config;
use crate::export::{export_devices, export_prefixes};
use crate::import::{ImportSummary, RowOutcome, import_all, read_rows};
use crate::reference::{ReferenceCaches, ReferenceKind, SharedCaches};
use crate::refresh::{RefreshOutcome, RefreshScheduler, RefreshTicket, View, ViewRows, device_rows, run_cycle};

/// Results delivered to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Refreshed(RefreshOutcome),
    LoggedIn {
        settings: ClientSettings,
        result: Result<(), String>,
    },
    Submitted {
        what: &'static str,
        result: Result<String, String>,
    },
    Imported(Result<ImportSummary, String>),
    Exported(Result<(PathBuf, usize), String>),
    DeviceLoaded(Result<Device, String>),
}

#[derive(Debug)]
pub enum Modal {
    Form(Form),
    Message {
        title: String,
        body: String,
        is_error: bool,
    },
    Device(Box<Device>),
}

impl Modal {
    /// Input windows freeze the refresh countdown
    pub fn is_input(&self) -> bool {
        matches!(self, Modal::Form(_))
    }

    fn message(title: impl Into<String>, body: impl Into<String>) -> Self {
        Modal::Message {
            title: title.into(),
            body: body.into(),
            is_error: false,
        }
    }

    fn error(title: impl Into<String>, body: impl Into<String>) -> Self {
        Modal::Message {
            title: title.into(),
            body: body.into(),
            is_error: true,
        }
    }
}

pub struct App {
    pub config: Config,
    api: Arc<dyn InventoryApi>,
    pub caches: Arc<SharedCaches>,
    pub scheduler: RefreshScheduler,
    pub view: View,
    lists: [ListState; 3],
    pub ip_rows: Vec<IpAddress>,
    pub vlan_rows: Vec<Vlan>,
    pub device_rows: Vec<Device>,
    pub search: TextInputField,
    pub searching: bool,
    pub modal: Option<Modal>,
    pub status: String,
    pub should_quit: bool,
    pub viewport_height: usize,
    tx: UnboundedSender<AppEvent>,
}

fn view_slot(view: View) -> usize {
    match view {
        View::IpAddresses => 0,
        View::Vlans => 1,
        View::Devices => 2,
    }
}

fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

impl App {
    pub fn new(config: Config, api: Arc<dyn InventoryApi>, tx: UnboundedSender<AppEvent>) -> Self {
        let scheduler = RefreshScheduler::new(config.refresh_interval());
        let modal = if config.has_token() {
            None
        } else {
            Some(Modal::Form(Form::login(&config.base_url, "")))
        };

        Self {
            config,
            api,
            caches: Arc::new(SharedCaches::default()),
            scheduler,
            view: View::IpAddresses,
            lists: Default::default(),
            ip_rows: Vec::new(),
            vlan_rows: Vec::new(),
            device_rows: Vec::new(),
            search: TextInputField::new(),
            searching: false,
            modal,
            status: "Connecting...".to_string(),
            should_quit: false,
            viewport_height: 20,
            tx,
        }
    }

    pub fn snapshot(&self) -> Arc<ReferenceCaches> {
        self.caches.snapshot()
    }

    pub fn list(&self) -> &ListState {
        &self.lists[view_slot(self.view)]
    }

    fn list_mut(&mut self) -> &mut ListState {
        &mut self.lists[view_slot(self.view)]
    }

    fn obscured(&self) -> bool {
        self.modal.as_ref().is_some_and(Modal::is_input)
    }

    // === Visible rows ===

    pub fn visible_ips(&self) -> Vec<&IpAddress> {
        let needle = self.search.value();
        self.ip_rows
            .iter()
            .filter(|ip| ip.address.contains(needle) || ip.description.contains(needle))
            .collect()
    }

    pub fn visible_vlans(&self) -> Vec<&Vlan> {
        let needle = self.search.value();
        self.vlan_rows
            .iter()
            .filter(|v| {
                v.name.contains(needle)
                    || v.vid.to_string().contains(needle)
                    || v.description.contains(needle)
            })
            .collect()
    }

    pub fn visible_devices(&self) -> Vec<&Device> {
        let needle = self.search.value();
        self.device_rows
            .iter()
            .filter(|d| d.label().contains(needle))
            .collect()
    }

    pub fn visible_len(&self) -> usize {
        match self.view {
            View::IpAddresses => self.visible_ips().len(),
            View::Vlans => self.visible_vlans().len(),
            View::Devices => self.visible_devices().len(),
        }
    }

    fn clamp_lists(&mut self) {
        for view in View::ALL {
            let len = match view {
                View::IpAddresses => self.visible_ips().len(),
                View::Vlans => self.visible_vlans().len(),
                View::Devices => self.visible_devices().len(),
            };
            self.lists[view_slot(view)].clamp(len);
        }
    }

    // === Timer ===

    /// Advance the active view's countdown; starts a cycle when due
    pub fn on_tick(&mut self, elapsed: Duration) {
        let obscured = self.obscured();
        if let Some(ticket) = self.scheduler.tick(self.view, elapsed, obscured) {
            self.spawn_refresh(ticket);
        }
    }

    fn spawn_refresh(&self, ticket: RefreshTicket) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = run_cycle(api.as_ref(), ticket).await;
            let _ = tx.send(AppEvent::Refreshed(outcome));
        });
    }

    // === Events ===

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.on_key(key),
            AppEvent::Resize => {}
            AppEvent::Refreshed(outcome) => self.on_refreshed(outcome),
            AppEvent::LoggedIn { settings, result } => self.on_logged_in(settings, result),
            AppEvent::Submitted { what, result } => {
                self.modal = Some(match result {
                    Ok(body) => {
                        self.scheduler.force(self.view);
                        Modal::message(format!("{} created", what), body)
                    }
                    Err(e) => Modal::error(format!("Failed to create {}", what), e),
                });
            }
            AppEvent::Imported(result) => {
                self.modal = Some(match result {
                    Ok(summary) => Modal::message("Import finished", import_report(&summary)),
                    Err(e) => Modal::error("Import failed", e),
                });
                self.scheduler.force_all();
            }
            AppEvent::Exported(result) => match result {
                Ok((path, count)) => {
                    self.status = format!("Exported {} rows to {}", count, path.display());
                }
                Err(e) => self.modal = Some(Modal::error("Export failed", e)),
            },
            AppEvent::DeviceLoaded(result) => {
                self.modal = Some(match result {
                    Ok(device) => Modal::Device(Box::new(device)),
                    Err(e) => Modal::error("Failed to load device", e),
                });
            }
        }
    }

    fn on_refreshed(&mut self, mut outcome: RefreshOutcome) {
        if !self.scheduler.complete(outcome.ticket) {
            warn!("Dropping result of a stale refresh cycle for {}", outcome.view());
            return;
        }

        let snapshot = outcome.apply(&self.caches);
        if outcome.view() == View::Devices {
            self.device_rows = device_rows(snapshot.get(ReferenceKind::Device));
        }
        match outcome.rows.take() {
            Some(ViewRows::IpAddresses(rows)) => self.ip_rows = rows,
            Some(ViewRows::Vlans(rows)) => self.vlan_rows = rows,
            None => {}
        }

        self.clamp_lists();
        if let Some(Modal::Form(form)) = &mut self.modal {
            form.clamp(&snapshot);
        }

        if outcome.auth_rejected() {
            self.status = "Credentials rejected, please log in".to_string();
            if !self.obscured() {
                self.modal = Some(Modal::Form(Form::login(&self.config.base_url, "")));
            }
        } else if outcome.is_clean() {
            self.status = format!("{} refreshed at {}", outcome.view(), timestamp());
        } else {
            self.status = outcome.failure_summary().unwrap_or_default();
        }
    }

    fn on_logged_in(&mut self, settings: ClientSettings, result: Result<(), String>) {
        match result {
            Ok(()) => {
                info!("Logged in to {}", settings.base_url);
                self.config.base_url = settings.base_url.clone();
                self.config.token = Some(settings.token.clone());
                self.status = format!("Logged in to {}", settings.base_url);
                self.api = Arc::new(InventoryClient::new(settings));
                self.caches.clear();
                self.ip_rows.clear();
                self.vlan_rows.clear();
                self.device_rows.clear();
                self.clamp_lists();
                // Cycles still running against the previous backend must not
                // complete into the fresh caches
                self.scheduler.reset();
            }
            Err(e) => {
                let mut form = Form::login(&settings.base_url, &settings.token);
                form.error = Some(e);
                self.modal = Some(Modal::Form(form));
            }
        }
    }

    // === Keys ===

    pub fn on_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.modal.is_some() {
            self.on_modal_key(key);
            return;
        }

        if self.searching {
            match key.code {
                KeyCode::Esc => {
                    self.searching = false;
                    self.search.clear();
                }
                KeyCode::Enter => self.searching = false,
                code => {
                    self.search.handle_key(code, None);
                }
            }
            self.clamp_lists();
            return;
        }

        let visible = self.visible_len();
        let height = self.viewport_height;
        if self.list_mut().handle_key(key.code, visible, height) {
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.switch_view(View::IpAddresses),
            KeyCode::Char('2') => self.switch_view(View::Vlans),
            KeyCode::Char('3') => self.switch_view(View::Devices),
            KeyCode::Char('r') => {
                self.scheduler.force(self.view);
                self.status = format!("Refreshing {}...", self.view);
            }
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Char('l') => {
                self.modal = Some(Modal::Form(Form::login(&self.config.base_url, "")));
            }
            KeyCode::Char('a') => {
                let form = match self.view {
                    View::IpAddresses => Form::ip_address(),
                    View::Vlans => Form::vlan(),
                    View::Devices => Form::device(),
                };
                self.modal = Some(Modal::Form(form));
            }
            KeyCode::Char('i') if self.view == View::Devices => {
                let default = self.config.export_dir().join("DeviceToImport.xlsx");
                self.modal = Some(Modal::Form(Form::path(
                    FormKind::Import,
                    &default.display().to_string(),
                )));
            }
            KeyCode::Char('x') => {
                let (kind, file) = match self.view {
                    View::Devices => (FormKind::ExportDevices, "devices.xlsx"),
                    View::IpAddresses => (FormKind::ExportPrefixes, "prefixes.xlsx"),
                    View::Vlans => return,
                };
                let default = self.config.export_dir().join(file);
                self.modal = Some(Modal::Form(Form::path(kind, &default.display().to_string())));
            }
            KeyCode::Enter if self.view == View::Devices => self.open_device_detail(),
            _ => {}
        }
    }

    fn switch_view(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.search.clear();
            self.clamp_lists();
            self.scheduler.force(view);
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };

        match modal {
            Modal::Form(form) => {
                let snapshot = self.caches.snapshot();
                match form.handle_key(key, &snapshot) {
                    FormAction::None => {}
                    FormAction::Cancel => self.modal = None,
                    FormAction::Submit => {
                        if let Some(Modal::Form(form)) = self.modal.take() {
                            self.submit_form(form, &snapshot);
                        }
                    }
                }
            }
            Modal::Message { .. } | Modal::Device(_) => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                    self.modal = None;
                }
            }
        }
    }

    fn open_device_detail(&mut self) {
        let Some(id) = self
            .list()
            .selected()
            .and_then(|i| self.visible_devices().get(i).map(|d| d.id))
        else {
            return;
        };

        let api = self.api.clone();
        let tx = self.tx.clone();
        self.status = format!("Loading device {}...", id);
        tokio::spawn(async move {
            let result = api.get_device(id).await.map_err(|e| e.to_string());
            let _ = tx.send(AppEvent::DeviceLoaded(result));
        });
    }

    // === Form submission ===

    fn submit_form(&mut self, mut form: Form, caches: &ReferenceCaches) {
        let api = self.api.clone();
        let tx = self.tx.clone();

        match form.kind {
            FormKind::Login => {
                let settings = ClientSettings {
                    base_url: form.text(FieldId::BaseUrl).trim().trim_end_matches('/').to_string(),
                    token: form.text(FieldId::Token).trim().to_string(),
                    ..self.config.client_settings()
                };
                self.status = format!("Logging in to {}...", settings.base_url);
                tokio::spawn(async move {
                    let client = InventoryClient::new(settings.clone());
                    let result = client.status().await.map(|_| ()).map_err(|e| e.to_string());
                    let _ = tx.send(AppEvent::LoggedIn { settings, result });
                });
            }
            FormKind::Device => match form.device_request(caches) {
                Ok(request) => {
                    tokio::spawn(async move {
                        let result = api.create_device(&request).await;
                        let _ = tx.send(AppEvent::Submitted {
                            what: "device",
                            result: result.map(|v| v.to_string()).map_err(|e| e.to_string()),
                        });
                    });
                }
                Err(e) => {
                    form.error = Some(e);
                    self.modal = Some(Modal::Form(form));
                }
            },
            FormKind::IpAddress => match form.ip_request(caches) {
                Ok(request) => {
                    tokio::spawn(async move {
                        let result = api.create_ip_address(&request).await;
                        let _ = tx.send(AppEvent::Submitted {
                            what: "IP address",
                            result: result.map(|v| v.to_string()).map_err(|e| e.to_string()),
                        });
                    });
                }
                Err(e) => {
                    form.error = Some(e);
                    self.modal = Some(Modal::Form(form));
                }
            },
            FormKind::Vlan => match form.vlan_request(caches) {
                Ok(request) => {
                    tokio::spawn(async move {
                        let result = api.create_vlan(&request).await;
                        let _ = tx.send(AppEvent::Submitted {
                            what: "VLAN",
                            result: result.map(|v| v.to_string()).map_err(|e| e.to_string()),
                        });
                    });
                }
                Err(e) => {
                    form.error = Some(e);
                    self.modal = Some(Modal::Form(form));
                }
            },
            FormKind::Import => {
                let path = PathBuf::from(form.text(FieldId::Path).trim());
                let sheet = self.config.import_sheet.clone();
                let snapshot = self.caches.snapshot();
                self.status = format!("Importing {}...", path.display());
                tokio::spawn(async move {
                    let result = async {
                        let rows = tokio::task::spawn_blocking(move || read_rows(&path, &sheet))
                            .await
                            .map_err(|e| e.to_string())?
                            .map_err(|e| format!("{:#}", e))?;
                        Ok::<_, String>(import_all(&rows, &snapshot, api.as_ref(), false).await)
                    }
                    .await;
                    let _ = tx.send(AppEvent::Imported(result));
                });
            }
            FormKind::ExportDevices => {
                let path = self.config.export_path(&PathBuf::from(form.text(FieldId::Path).trim()));
                let devices = self.device_rows.clone();
                let filter = self.search.value().to_string();
                tokio::task::spawn_blocking(move || {
                    let result = export_devices(&path, &devices, &filter)
                        .map(|count| (path, count))
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(AppEvent::Exported(result));
                });
            }
            FormKind::ExportPrefixes => {
                let path = self.config.export_path(&PathBuf::from(form.text(FieldId::Path).trim()));
                self.status = "Fetching prefixes...".to_string();
                tokio::spawn(async move {
                    let result = match api.fetch_collection(Collection::Prefixes).await {
                        Ok(raw) => {
                            let prefixes: Vec<Prefix> = decode_records(Collection::Prefixes, raw);
                            tokio::task::spawn_blocking(move || {
                                export_prefixes(&path, &prefixes)
                                    .map(|count| (path, count))
                                    .map_err(|e| format!("{:#}", e))
                            })
                            .await
                            .unwrap_or_else(|e| Err(e.to_string()))
                        }
                        Err(e) => Err(e.to_string()),
                    };
                    let _ = tx.send(AppEvent::Exported(result));
                });
            }
        }
    }
}

/// Multi-line summary shown after an import
fn import_report(summary: &ImportSummary) -> String {
    let mut lines = vec![summary.headline()];
    for report in &summary.reports {
        match &report.outcome {
            RowOutcome::Unresolved(columns) => {
                let columns: Vec<_> = columns
                    .iter()
                    .map(|(kind, resolution)| format!("{} {}", kind, resolution.label()))
                    .collect();
                lines.push(format!("row {} '{}': {}", report.line, report.name, columns.join(", ")));
            }
            RowOutcome::Failed(message) => {
                lines.push(format!("row {} '{}': {}", report.line, report.name, message));
            }
            _ => {}
        }
    }
    lines.join("\n")
}
