//! The printer state model.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

use super::summary::{CountSummary, PrinterStatusSummary, SUMMARY_SECTIONS};
use crate::data::config::{
    is_bed_heater_section, is_tool_section, BED_MESH_PROFILE_PREFIX, GCODE_MACRO_PREFIX,
};
use crate::data::{
    BedMeshProfile, ConfigSection, HeaterDevice, HeaterField, IdleState, PowerDeviceRecord,
    PowerStatus, PowerTopology, PrintStatsState, PrinterConfig, PrinterState, StateCandidate,
    StatusUpdate, Subsystem, WebhooksState,
};
use crate::error::{ModelError, Result};
use crate::event_bus::{EventBus, PrinterEvent};
use crate::types::Callback;

/// Version reported before the first snapshot
const UNKNOWN_VERSION: &str = "Unknown";

/// Device name of the primary bed heater
const HEATER_BED: &str = "heater_bed";

/// Snapshot entry held as typed configuration rather than as telemetry
const CONFIGFILE: &str = "configfile";

/// In-memory model of one printer
///
/// The model is fed by a single writer: a full snapshot through
/// [`PrinterModel::reinit`], then partial payloads through
/// [`PrinterModel::process_update`]. Power devices flow through
/// [`PrinterModel::configure_power_devices`] and
/// [`PrinterModel::process_power_update`].
pub struct PrinterModel {
    software_version: String,
    state: PrinterState,
    config: PrinterConfig,
    tools: Vec<String>,
    tool_count: usize,
    extruder_count: usize,
    devices: BTreeMap<String, HeaterDevice>,
    data: BTreeMap<Subsystem, Map<String, Value>>,
    extra: BTreeMap<String, Value>,
    power_devices: BTreeMap<String, PowerStatus>,
    callbacks: HashMap<PrinterState, Callback>,
    events: EventBus,
}

impl PrinterModel {
    /// Create an empty model in the `disconnected` state
    pub fn new() -> Self {
        Self::with_event_bus(EventBus::new())
    }

    /// Create an empty model publishing on the given bus
    pub fn with_event_bus(events: EventBus) -> Self {
        Self {
            software_version: UNKNOWN_VERSION.to_string(),
            state: PrinterState::Disconnected,
            config: PrinterConfig::default(),
            tools: Vec::new(),
            tool_count: 0,
            extruder_count: 0,
            devices: BTreeMap::new(),
            data: BTreeMap::new(),
            extra: BTreeMap::new(),
            power_devices: BTreeMap::new(),
            callbacks: HashMap::new(),
            events,
        }
    }

    /// Rebuild the model from a full snapshot
    ///
    /// The snapshot must contain `configfile.config`. Configuration,
    /// devices, tools and the telemetry cache are replaced; state, power
    /// devices, callbacks and subscribers are kept. On error the model is
    /// left exactly as it was.
    pub fn reinit(&mut self, software_version: &str, snapshot: &Value) -> Result<()> {
        tracing::debug!("Host object status: {}", snapshot);

        let raw_config = snapshot
            .get("configfile")
            .and_then(|configfile| configfile.get("config"))
            .ok_or_else(|| ModelError::MissingKey {
                key: "configfile.config".to_string(),
            })?;
        let config = PrinterConfig::from_value(raw_config)?;
        let update = StatusUpdate::from_value(snapshot)?;

        let mut tools = Vec::new();
        let mut extruder_count = 0;
        let mut devices = BTreeMap::new();
        for name in config.names() {
            if is_tool_section(name) {
                devices.insert(name.to_string(), HeaterDevice::default());
                tools.push(name.to_string());
                if !config.has_shared_heater(name) {
                    extruder_count += 1;
                }
            }
            if is_bed_heater_section(name) {
                devices.insert(name.to_string(), HeaterDevice::default());
            }
        }
        tools.sort();

        self.software_version = software_version.to_string();
        self.tool_count = tools.len();
        self.extruder_count = extruder_count;
        self.tools = tools;
        self.devices = devices;
        self.config = config;
        self.data.clear();
        self.extra.clear();

        self.apply_update(update);

        tracing::info!("Firmware version: {}", self.software_version);
        tracing::info!(
            "Tool count: {} Heaters: {}",
            self.tool_count,
            self.extruder_count
        );

        self.events.publish(PrinterEvent::Reinitialized {
            software_version: self.software_version.clone(),
            tool_count: self.tool_count,
            extruder_count: self.extruder_count,
        });
        Ok(())
    }

    /// Merge a partial status payload into the model
    ///
    /// Malformed payloads and entries are logged and dropped; the rest of
    /// the payload is still applied.
    pub fn process_update(&mut self, payload: &Value) {
        match StatusUpdate::from_value(payload) {
            Ok(update) => self.apply_update(update),
            Err(e) => tracing::warn!("Dropping status update: {}", e),
        }
    }

    /// Merge an already decoded status payload into the model
    ///
    /// Evaluates the state at most once, and only when the payload touches
    /// `webhooks`, `idle_timeout`, `pause_resume` or `print_stats`.
    pub fn apply_update(&mut self, update: StatusUpdate) {
        if update.is_empty() && update.rejected.is_empty() {
            tracing::trace!("Empty status update");
            return;
        }

        for rejected in &update.rejected {
            tracing::warn!("Skipping malformed status entry: {}", rejected);
        }

        let evaluate = update.triggers_evaluation();

        for (subsystem, fields) in update.subsystems {
            let cached = self.data.entry(subsystem).or_default();
            for (field, value) in fields {
                cached.insert(field, value);
            }
        }

        for (name, heater) in update.heaters {
            let Some(device) = self.devices.get_mut(&name) else {
                tracing::trace!("No device '{}', keeping its telemetry as a plain entry", name);
                let mut fields = Map::new();
                if let Some(temperature) = heater.temperature {
                    fields.insert(HeaterField::Temperature.as_str().to_string(), temperature.into());
                }
                if let Some(target) = heater.target {
                    fields.insert(HeaterField::Target.as_str().to_string(), target.into());
                }
                self.merge_extra(name, Value::Object(fields));
                continue;
            };
            if let Some(target) = heater.target {
                device.target = target;
            }
            if let Some(temperature) = heater.temperature {
                device.temperature = temperature;
            }
        }

        for (key, value) in update.other {
            if key == CONFIGFILE {
                continue;
            }
            self.merge_extra(key, value);
        }

        if evaluate {
            self.evaluate_state();
        }
    }

    /// Shallow-merge an entry into the passthrough cache
    fn merge_extra(&mut self, key: String, value: Value) {
        match (self.extra.get_mut(&key), value) {
            (Some(Value::Object(cached)), Value::Object(fields)) => {
                for (field, value) in fields {
                    cached.insert(field, value);
                }
            }
            (_, value) => {
                self.extra.insert(key, value);
            }
        }
    }

    /// Derive the observable state from the cached sub-states and apply it
    ///
    /// A `busy` candidate keeps the previous state.
    pub fn evaluate_state(&mut self) {
        match self.candidate_state() {
            Some(StateCandidate::Observable(state)) => {
                self.change_state(state);
            }
            Some(StateCandidate::Busy) => {
                tracing::trace!("Toolhead busy without a file print; keeping '{}'", self.state);
            }
            None => {}
        }
    }

    /// Compute the reconciliation candidate without applying it
    ///
    /// Returns `None` when `webhooks.state` is absent or not a recognized
    /// state name.
    pub fn candidate_state(&self) -> Option<StateCandidate> {
        let webhooks = WebhooksState::from_reported(self.cached_str(Subsystem::Webhooks, "state")?);
        if webhooks != WebhooksState::Ready {
            return PrinterState::from_name(webhooks.as_str()).map(StateCandidate::Observable);
        }

        let idle = IdleState::from_reported(
            self.cached_str(Subsystem::IdleTimeout, "state")
                .unwrap_or_default(),
        );
        let print = PrintStatsState::from_reported(
            self.cached_str(Subsystem::PrintStats, "state")
                .unwrap_or_default(),
        );

        let candidate = if idle == IdleState::Printing && print != PrintStatsState::Printing {
            StateCandidate::Busy
        } else if idle == IdleState::Printing {
            StateCandidate::Observable(PrinterState::Printing)
        } else if print == PrintStatsState::Paused {
            StateCandidate::Observable(PrinterState::Paused)
        } else {
            StateCandidate::Observable(PrinterState::Ready)
        };
        Some(candidate)
    }

    /// Whether the toolhead is moving without an active file print
    pub fn is_toolhead_busy(&self) -> bool {
        self.candidate_state() == Some(StateCandidate::Busy)
    }

    /// Transition to `state`
    ///
    /// A no-op when `state` is already current. Otherwise the state slot
    /// callback runs first, then subscribers receive
    /// [`PrinterEvent::StateChanged`]. Returns whether a transition
    /// happened.
    pub fn change_state(&mut self, state: PrinterState) -> bool {
        if state == self.state {
            return false;
        }

        let previous = self.state;
        tracing::debug!("Changing state from '{}' to '{}'", previous, state);
        self.state = state;

        if let Some(callback) = self.callbacks.get(&state) {
            tracing::debug!("Running callback for state: {}", state);
            callback();
        }
        self.events.publish(PrinterEvent::StateChanged {
            previous,
            current: state,
        });
        true
    }

    /// Transition to a state given by its wire name
    ///
    /// Unrecognized names, `busy` included, are ignored.
    pub fn change_state_named(&mut self, name: &str) -> bool {
        match PrinterState::from_name(name) {
            Some(state) => self.change_state(state),
            None => {
                tracing::trace!("Ignoring transition to unknown state '{}'", name);
                false
            }
        }
    }

    /// Register state slot callbacks
    ///
    /// Each entry replaces the slot for its state; other slots are kept.
    pub fn set_callbacks<I>(&mut self, callbacks: I)
    where
        I: IntoIterator<Item = (PrinterState, Callback)>,
    {
        for (state, callback) in callbacks {
            self.callbacks.insert(state, callback);
        }
    }

    /// Register the callback for a single state
    pub fn set_callback<F>(&mut self, state: PrinterState, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.insert(state, Box::new(callback));
    }

    /// Clear the callback for a single state
    pub fn clear_callback(&mut self, state: PrinterState) {
        self.callbacks.remove(&state);
    }

    /// Event bus for state, power and reinit events
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Replace all power devices from a topology payload
    pub fn configure_power_devices(&mut self, topology: &PowerTopology) {
        tracing::debug!("Processing power devices: {:?}", topology.devices);
        self.power_devices = topology
            .devices
            .iter()
            .map(|record| {
                (
                    record.device.clone(),
                    PowerStatus::from_reported(&record.status),
                )
            })
            .collect();
        tracing::debug!("Power devices: {:?}", self.power_devices);
    }

    /// Apply a status delta to a known power device
    ///
    /// Unknown devices are ignored. Returns whether the delta was applied.
    pub fn process_power_update(&mut self, record: &PowerDeviceRecord) -> bool {
        let Some(status) = self.power_devices.get_mut(&record.device) else {
            tracing::trace!("Ignoring power update for unknown device '{}'", record.device);
            return false;
        };

        *status = PowerStatus::from_reported(&record.status);
        let status = *status;
        self.events.publish(PrinterEvent::PowerChanged {
            device: record.device.clone(),
            status,
        });
        true
    }

    /// Set one telemetry field of a known device
    pub fn set_dev_stat(&mut self, dev: &str, field: HeaterField, value: f64) -> bool {
        match self.devices.get_mut(dev) {
            Some(device) => {
                device.set(field, value);
                true
            }
            None => {
                tracing::trace!("No device '{}' for {}", dev, field.as_str());
                false
            }
        }
    }

    /// Set the temperature, and optionally the target, of a known device
    pub fn set_dev_temps(&mut self, dev: &str, temperature: f64, target: Option<f64>) -> bool {
        match self.devices.get_mut(dev) {
            Some(device) => {
                device.temperature = temperature;
                if let Some(target) = target {
                    device.target = target;
                }
                true
            }
            None => false,
        }
    }

    /// Set the target of a known device
    pub fn set_target(&mut self, dev: &str, target: f64) -> bool {
        self.set_dev_stat(dev, HeaterField::Target, target)
    }

    pub fn get_state(&self) -> PrinterState {
        self.state
    }

    pub fn get_klipper_version(&self) -> &str {
        &self.software_version
    }

    pub fn get_config(&self) -> &PrinterConfig {
        &self.config
    }

    pub fn config_section_exists(&self, section: &str) -> bool {
        self.config.contains(section)
    }

    /// Section names starting with `prefix`; an empty prefix lists all
    pub fn get_config_section_list(&self, prefix: &str) -> Vec<&str> {
        self.config.section_names(prefix)
    }

    pub fn get_config_section(&self, section: &str) -> Option<&ConfigSection> {
        self.config.section(section)
    }

    pub fn get_gcode_macros(&self) -> Vec<&str> {
        self.config.section_names(GCODE_MACRO_PREFIX)
    }

    /// Look up a mesh profile by its name, without the `bed_mesh ` prefix
    pub fn get_bed_mesh_profile(&self, profile: &str) -> Option<&BedMeshProfile> {
        self.config
            .mesh_profile(&format!("{}{}", BED_MESH_PROFILE_PREFIX, profile))
    }

    /// All mesh profiles as `(profile name, profile)` pairs
    pub fn get_bed_mesh_profiles(&self) -> Vec<(&str, &BedMeshProfile)> {
        self.config
            .mesh_profiles()
            .iter()
            .map(|(section, profile)| {
                let name = section
                    .strip_prefix(BED_MESH_PROFILE_PREFIX)
                    .unwrap_or(section);
                (name, profile)
            })
            .collect()
    }

    /// Cached fields of one subsystem
    pub fn get_stat(&self, subsystem: Subsystem) -> Option<&Map<String, Value>> {
        self.data.get(&subsystem)
    }

    /// One cached field of one subsystem
    pub fn get_stat_field(&self, subsystem: Subsystem, field: &str) -> Option<&Value> {
        self.data.get(&subsystem)?.get(field)
    }

    /// A cached entry outside the known subsystems
    ///
    /// Holds unknown objects such as `motion_report` as well as the
    /// non-heater fields of tools and heaters (`extruder.pressure_advance`).
    pub fn get_other_stat(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn get_other_stat_field(&self, name: &str, field: &str) -> Option<&Value> {
        self.extra.get(name)?.get(field)
    }

    /// The whole telemetry cache as `{name: {field: value}}`
    ///
    /// Heater temperatures and targets live in the device map and are not
    /// part of the snapshot.
    pub fn telemetry_snapshot(&self) -> Value {
        let subsystems = self.data.iter().map(|(subsystem, fields)| {
            (subsystem.as_str().to_string(), Value::Object(fields.clone()))
        });
        let extra = self
            .extra
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()));
        Value::Object(subsystems.chain(extra).collect())
    }

    pub fn get_dev_stats(&self, dev: &str) -> Option<HeaterDevice> {
        self.devices.get(dev).copied()
    }

    pub fn get_dev_stat(&self, dev: &str, field: HeaterField) -> Option<f64> {
        self.devices.get(dev).map(|device| device.get(field))
    }

    /// Names of all devices, tools and bed heaters alike
    pub fn get_devices(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Tool names in firmware index order
    pub fn get_tools(&self) -> &[String] {
        &self.tools
    }

    /// Firmware index of a tool
    pub fn get_tool_number(&self, tool: &str) -> Option<usize> {
        self.tools.iter().position(|t| t == tool)
    }

    pub fn get_tool_count(&self) -> usize {
        self.tool_count
    }

    /// Number of tools with their own heater
    pub fn get_extruder_count(&self) -> usize {
        self.extruder_count
    }

    pub fn has_heated_bed(&self) -> bool {
        self.devices.contains_key(HEATER_BED)
    }

    /// Power device names in name order
    pub fn get_power_devices(&self) -> Vec<&str> {
        self.power_devices.keys().map(String::as_str).collect()
    }

    pub fn get_power_device_status(&self, device: &str) -> Option<PowerStatus> {
        self.power_devices.get(device).copied()
    }

    /// Build the consolidated status summary
    pub fn get_printer_status_data(&self) -> PrinterStatusSummary {
        let cached = |subsystem| self.get_stat(subsystem).cloned().unwrap_or_default();

        PrinterStatusSummary {
            bltouch: self.config_section_exists("bltouch"),
            probe: self.config_section_exists("probe"),
            gcode_macros: CountSummary {
                count: self.get_gcode_macros().len(),
            },
            power_devices: CountSummary {
                count: self.power_devices.len(),
            },
            idle_timeout: cached(Subsystem::IdleTimeout),
            pause_resume: cached(Subsystem::PauseResume),
            config_sections: SUMMARY_SECTIONS
                .iter()
                .filter_map(|name| {
                    self.config
                        .section(name)
                        .map(|section| (name.to_string(), section.clone()))
                })
                .collect(),
        }
    }

    fn cached_str(&self, subsystem: Subsystem, field: &str) -> Option<&str> {
        self.get_stat_field(subsystem, field)?.as_str()
    }
}

impl Default for PrinterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PrinterModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterModel")
            .field("software_version", &self.software_version)
            .field("state", &self.state)
            .field("tools", &self.tools)
            .field("devices", &self.devices)
            .field("power_devices", &self.power_devices)
            .field("callbacks", &self.callbacks.len())
            .field("events", &self.events)
            .finish()
    }
}
