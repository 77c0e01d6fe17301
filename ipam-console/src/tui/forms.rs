//! Modal input forms
//!
//! A form is a column of fields with one in focus. Text fields take typed
//! input; reference fields cycle through a cache with ←/→ and start on the
//! "None" sentinel. Enter asks for confirmation and `y` submits.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::widgets::TextInputField;
use crate::api::models::STATUS_ACTIVE;
use crate::api::{DeviceRequest, IpAddressRequest, NestedRef, VlanRequest};
use crate::reference::cache::SENTINEL_LABEL;
use crate::reference::{ReferenceCaches, ReferenceKind, SENTINEL_INDEX, Selection};

/// What the form is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Login,
    Device,
    IpAddress,
    Vlan,
    Import,
    ExportDevices,
    ExportPrefixes,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::Login => "Log in",
            FormKind::Device => "Add device",
            FormKind::IpAddress => "Add IP address",
            FormKind::Vlan => "Add VLAN",
            FormKind::Import => "Import devices",
            FormKind::ExportDevices => "Export devices",
            FormKind::ExportPrefixes => "Export prefixes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    BaseUrl,
    Token,
    Name,
    Serial,
    Address,
    DnsName,
    Description,
    Vid,
    Path,
    Reference(ReferenceKind),
}

#[derive(Debug, Clone)]
pub enum FieldInput {
    Text(TextInputField),
    Choice(Selection),
}

#[derive(Debug, Clone)]
pub struct Field {
    pub id: FieldId,
    pub label: &'static str,
    pub required: bool,
    pub input: FieldInput,
}

impl Field {
    fn text(id: FieldId, label: &'static str, required: bool) -> Self {
        Self {
            id,
            label,
            required,
            input: FieldInput::Text(TextInputField::new()),
        }
    }

    fn choice(kind: ReferenceKind, label: &'static str, required: bool) -> Self {
        Self {
            id: FieldId::Reference(kind),
            label,
            required,
            input: FieldInput::Choice(Selection::default()),
        }
    }

    fn with_input(mut self, input: TextInputField) -> Self {
        self.input = FieldInput::Text(input);
        self
    }

    /// Text shown for the field's current value
    pub fn display(&self, caches: &ReferenceCaches) -> String {
        match (&self.input, self.id) {
            (FieldInput::Text(input), _) => input.display(),
            (FieldInput::Choice(selection), FieldId::Reference(kind)) => {
                let cache = caches.get(kind);
                if selection.is_none() && cache.is_empty() {
                    return format!("{} (nothing loaded)", SENTINEL_LABEL);
                }
                cache
                    .names()
                    .get(selection.index())
                    .map(|name| name.to_string())
                    .unwrap_or_default()
            }
            (FieldInput::Choice(_), _) => String::new(),
        }
    }
}

/// Result of feeding a key to a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    None,
    Cancel,
    Submit,
}

#[derive(Debug, Clone)]
pub struct Form {
    pub kind: FormKind,
    pub fields: Vec<Field>,
    pub focus: usize,
    /// Waiting for `y` after Enter
    pub confirming: bool,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, fields: Vec<Field>) -> Self {
        Self {
            kind,
            fields,
            focus: 0,
            confirming: false,
            error: None,
        }
    }

    pub fn login(base_url: &str, token: &str) -> Self {
        Self::new(
            FormKind::Login,
            vec![
                Field::text(FieldId::BaseUrl, "Base URL", true)
                    .with_input(TextInputField::new().with_value(base_url)),
                Field::text(FieldId::Token, "API token", true)
                    .with_input(TextInputField::masked().with_value(token)),
            ],
        )
    }

    pub fn device() -> Self {
        Self::new(
            FormKind::Device,
            vec![
                Field::text(FieldId::Name, "Name", true),
                Field::text(FieldId::Serial, "Serial", false),
                Field::choice(ReferenceKind::Tenant, "Tenant", false),
                Field::choice(ReferenceKind::Manufacturer, "Manufacturer", false),
                Field::choice(ReferenceKind::DeviceRole, "Role", true),
                Field::choice(ReferenceKind::Site, "Site", true),
                Field::choice(ReferenceKind::DeviceType, "Device type", true),
            ],
        )
    }

    pub fn ip_address() -> Self {
        Self::new(
            FormKind::IpAddress,
            vec![
                Field::text(FieldId::Address, "Address (CIDR)", true),
                Field::text(FieldId::DnsName, "DNS name", false),
                Field::text(FieldId::Description, "Description", false),
                Field::choice(ReferenceKind::Tenant, "Tenant", false),
            ],
        )
    }

    pub fn vlan() -> Self {
        Self::new(
            FormKind::Vlan,
            vec![
                Field::text(FieldId::Vid, "VLAN id", true),
                Field::text(FieldId::Name, "Name", true),
                Field::choice(ReferenceKind::Tenant, "Tenant", false),
                Field::choice(ReferenceKind::Site, "Site", false),
            ],
        )
    }

    /// Single-path form for import and export
    pub fn path(kind: FormKind, default_path: &str) -> Self {
        Self::new(
            kind,
            vec![
                Field::text(FieldId::Path, "File (.xlsx or .csv)", true)
                    .with_input(TextInputField::new().with_value(default_path)),
            ],
        )
    }

    pub fn text(&self, id: FieldId) -> &str {
        self.fields
            .iter()
            .find(|f| f.id == id)
            .and_then(|f| match &f.input {
                FieldInput::Text(input) => Some(input.value()),
                FieldInput::Choice(_) => None,
            })
            .unwrap_or("")
    }

    pub fn selection(&self, kind: ReferenceKind) -> Selection {
        self.fields
            .iter()
            .find(|f| f.id == FieldId::Reference(kind))
            .and_then(|f| match &f.input {
                FieldInput::Choice(selection) => Some(*selection),
                FieldInput::Text(_) => None,
            })
            .unwrap_or_default()
    }

    /// Point a reference field at a local index
    pub fn select(&mut self, kind: ReferenceKind, index: usize) {
        for field in &mut self.fields {
            if let (FieldId::Reference(k), FieldInput::Choice(selection)) = (field.id, &mut field.input) {
                if k == kind {
                    *selection = Selection::new(index);
                }
            }
        }
    }

    /// Clamp every reference selection after the caches were swapped
    pub fn clamp(&mut self, caches: &ReferenceCaches) {
        for field in &mut self.fields {
            if let (FieldId::Reference(kind), FieldInput::Choice(selection)) = (field.id, &mut field.input) {
                selection.clamp(caches.get(kind).len());
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, caches: &ReferenceCaches) -> FormAction {
        if self.confirming {
            self.confirming = false;
            return match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => FormAction::Submit,
                KeyCode::Esc => FormAction::Cancel,
                _ => FormAction::None,
            };
        }

        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => {
                self.error = self.missing_required(caches);
                self.confirming = self.error.is_none();
                return FormAction::None;
            }
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % self.fields.len();
                return FormAction::None;
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
                return FormAction::None;
            }
            _ => {}
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return FormAction::None;
        };
        let mut jump = None;
        match (&mut field.input, field.id) {
            (FieldInput::Text(input), _) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL) {
                    input.handle_key(key.code, None);
                }
            }
            (FieldInput::Choice(selection), FieldId::Reference(kind)) => {
                let len = caches.get(kind).len();
                match key.code {
                    KeyCode::Right | KeyCode::Char(' ') => selection.next(len),
                    KeyCode::Left => selection.prev(len),
                    KeyCode::Home => jump = Some((kind, SENTINEL_INDEX)),
                    KeyCode::End => jump = Some((kind, len.saturating_sub(1))),
                    _ => {}
                }
            }
            (FieldInput::Choice(_), _) => {}
        }
        if let Some((kind, index)) = jump {
            self.select(kind, index);
        }
        FormAction::None
    }

    fn missing_required(&self, caches: &ReferenceCaches) -> Option<String> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .find(|f| match (&f.input, f.id) {
                (FieldInput::Text(input), _) => input.value().trim().is_empty(),
                (FieldInput::Choice(selection), FieldId::Reference(kind)) => {
                    selection.remote_id(caches.get(kind)).is_none()
                }
                (FieldInput::Choice(_), _) => false,
            })
            .map(|f| format!("{} is required", f.label))
    }

    pub fn device_request(&self, caches: &ReferenceCaches) -> Result<DeviceRequest, String> {
        let required = |kind: ReferenceKind| {
            self.selection(kind)
                .remote_id(caches.get(kind))
                .ok_or_else(|| format!("{} is required", kind))
        };
        let optional = |kind: ReferenceKind| self.selection(kind).remote_id(caches.get(kind));

        let name = self.text(FieldId::Name).trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }

        Ok(DeviceRequest {
            name: name.to_string(),
            device_type: required(ReferenceKind::DeviceType)?,
            role: required(ReferenceKind::DeviceRole)?,
            site: required(ReferenceKind::Site)?,
            tenant: optional(ReferenceKind::Tenant),
            manufacturer: optional(ReferenceKind::Manufacturer),
            status: STATUS_ACTIVE.to_string(),
            serial: self.text(FieldId::Serial).trim().to_string(),
        })
    }

    /// The tenant is sent as `{name, slug}`; the sentinel omits it
    pub fn ip_request(&self, caches: &ReferenceCaches) -> Result<IpAddressRequest, String> {
        let address = self.text(FieldId::Address).trim();
        if address.is_empty() {
            return Err("Address is required".to_string());
        }
        let tenant = self
            .selection(ReferenceKind::Tenant)
            .entry(caches.get(ReferenceKind::Tenant))
            .map(|entry| NestedRef {
                name: entry.display_name.clone(),
                slug: entry.slug().unwrap_or_default().to_string(),
            });

        Ok(IpAddressRequest {
            address: address.to_string(),
            status: STATUS_ACTIVE.to_string(),
            tenant,
            dns_name: self.text(FieldId::DnsName).trim().to_string(),
            description: self.text(FieldId::Description).trim().to_string(),
        })
    }

    pub fn vlan_request(&self, caches: &ReferenceCaches) -> Result<VlanRequest, String> {
        let vid: u16 = self
            .text(FieldId::Vid)
            .trim()
            .parse()
            .ok()
            .filter(|vid| (1..=4094).contains(vid))
            .ok_or_else(|| "VLAN id must be a number between 1 and 4094".to_string())?;
        let name = self.text(FieldId::Name).trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }

        Ok(VlanRequest {
            vid,
            name: name.to_string(),
            status: STATUS_ACTIVE.to_string(),
            tenant: self
                .selection(ReferenceKind::Tenant)
                .remote_id(caches.get(ReferenceKind::Tenant)),
            site: self
                .selection(ReferenceKind::Site)
                .remote_id(caches.get(ReferenceKind::Site)),
        })
    }
}
