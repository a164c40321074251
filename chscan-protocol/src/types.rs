//! Scanner event type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Broadcast kind of a scan cycle or of a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Analog television (ATV).
    Analog,
    /// Digital television (DTV).
    Digital,
}

impl ChannelKind {
    /// Stable name used in logs and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Analog => "analog",
            ChannelKind::Digital => "digital",
        }
    }

    /// Parse the stable name back.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "analog" => Some(ChannelKind::Analog),
            "digital" => Some(ChannelKind::Digital),
            _ => None,
        }
    }
}

/// How a scan was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanMethod {
    /// Full automatic sweep over the band.
    Auto,
    /// User-driven scan of a single frequency.
    Manual,
}

/// Scan mode: which broadcast is being scanned and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanMode {
    pub kind: ChannelKind,
    pub method: ScanMethod,
}

impl ScanMode {
    pub fn new(kind: ChannelKind, method: ScanMethod) -> Self {
        Self { kind, method }
    }

    pub fn is_manual(&self) -> bool {
        self.method == ScanMethod::Manual
    }

    pub fn is_auto(&self) -> bool {
        self.method == ScanMethod::Auto
    }

    pub fn is_digital(&self) -> bool {
        self.kind == ChannelKind::Digital
    }

    pub fn is_analog(&self) -> bool {
        self.kind == ChannelKind::Analog
    }
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let method = match self.method {
            ScanMethod::Auto => "auto",
            ScanMethod::Manual => "manual",
        };
        write!(f, "{}/{}", self.kind.as_str(), method)
    }
}

/// Channel numbering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// Sequential display numbers in discovery order.
    Number,
    /// Broadcaster-assigned logical channel numbers.
    Lcn,
}

impl SortMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Number => "number",
            SortMode::Lcn => "lcn",
        }
    }
}

/// Service classification of one broadcast service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Television service.
    AudioVideo,
    /// Radio service.
    Audio,
    /// Data services and anything else; never numbered.
    Other,
}

impl ServiceKind {
    /// Classify the small integer service type carried by DTV program data
    /// (1 = TV, 2 = radio, anything else = other).
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ServiceKind::AudioVideo,
            2 => ServiceKind::Audio,
            _ => ServiceKind::Other,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ServiceKind::AudioVideo => 1,
            ServiceKind::Audio => 2,
            ServiceKind::Other => 0,
        }
    }

    pub fn is_other(&self) -> bool {
        *self == ServiceKind::Other
    }
}

/// Service identity triple: the key used to recognise the same service
/// across rescans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceTriple {
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
}

impl ServiceTriple {
    pub fn new(original_network_id: u16, transport_stream_id: u16, service_id: u16) -> Self {
        Self {
            original_network_id,
            transport_stream_id,
            service_id,
        }
    }
}

impl fmt::Display for ServiceTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "onid=0x{:04X}, tsid=0x{:04X}, sid=0x{:04X}",
            self.original_network_id, self.transport_stream_id, self.service_id
        )
    }
}

// ============================================================================
// LCN records
// ============================================================================

/// One LCN candidate slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcnSlot {
    pub lcn: u32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub valid: bool,
}

fn default_true() -> bool {
    true
}

impl LcnSlot {
    pub fn new(lcn: u32, visible: bool, valid: bool) -> Self {
        Self {
            lcn,
            visible,
            valid,
        }
    }

    /// A slot that carries no usable LCN.
    pub fn invalid() -> Self {
        Self {
            lcn: 0,
            visible: false,
            valid: false,
        }
    }
}

/// LCN record reported by the demodulator for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerLcnInfo {
    pub net_id: u16,
    pub ts_id: u16,
    pub service_id: u16,
    /// Slot 0 is the preferred candidate, slot 1 the fallback.
    pub slots: [LcnSlot; 2],
}

impl ScannerLcnInfo {
    pub fn new(net_id: u16, ts_id: u16, service_id: u16, slots: [LcnSlot; 2]) -> Self {
        Self {
            net_id,
            ts_id,
            service_id,
            slots,
        }
    }

    pub fn triple(&self) -> ServiceTriple {
        ServiceTriple::new(self.net_id, self.ts_id, self.service_id)
    }

    /// Both candidate slots carry a valid LCN.
    pub fn both_valid(&self) -> bool {
        self.slots[0].valid && self.slots[1].valid
    }
}

// ============================================================================
// Event payloads
// ============================================================================

/// Payload of SCAN_BEGIN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanBegin {
    pub mode: ScanMode,
    pub sort: SortMode,
}

/// Payload of LCN_INFO_DATA.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LcnInfoData {
    pub mode: ScanMode,
    pub sort: SortMode,
    pub lcn: ScannerLcnInfo,
}

/// Payload of DTV_PROG_DATA: one digital service found on the current
/// frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DtvProgramData {
    pub mode: ScanMode,
    pub sort: SortMode,

    // Tuning
    pub frequency: u32,
    #[serde(default)]
    pub modulation: u32,
    #[serde(default)]
    pub symbol_rate: u32,
    #[serde(default)]
    pub bandwidth: u32,

    // Service
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,
    /// Service type code (1 = TV, 2 = radio, other = data).
    pub service_type: i32,
    /// Multilingual raw service name.
    #[serde(default)]
    pub raw_name: String,
    #[serde(default)]
    pub scrambled: bool,

    // Elementary streams
    #[serde(default)]
    pub pcr_pid: Option<u16>,
    #[serde(default)]
    pub video_pid: Option<u16>,
    #[serde(default)]
    pub video_format: Option<i32>,
    #[serde(default)]
    pub audio_pids: Vec<u16>,
    #[serde(default)]
    pub audio_formats: Vec<i32>,
    #[serde(default)]
    pub audio_langs: Vec<String>,
    #[serde(default)]
    pub subtitle_pids: Vec<u16>,
    #[serde(default)]
    pub subtitle_langs: Vec<String>,
}

impl DtvProgramData {
    pub fn triple(&self) -> ServiceTriple {
        ServiceTriple::new(
            self.original_network_id,
            self.transport_stream_id,
            self.service_id,
        )
    }
}

/// Payload of ATV_PROG_DATA: one analog carrier locked during the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtvProgramData {
    pub mode: ScanMode,
    pub sort: SortMode,
    pub frequency: u32,
    #[serde(default)]
    pub video_std: i32,
    #[serde(default)]
    pub audio_std: i32,
    #[serde(default)]
    pub is_auto_std: bool,
}

/// Payload of SCAN_PROGRESS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanProgress {
    pub mode: ScanMode,
    pub sort: SortMode,
    /// Percentage of the band covered so far.
    pub percent: u8,
    #[serde(default)]
    pub frequency: u32,
    /// Services found so far (as counted by the demodulator).
    #[serde(default)]
    pub channel_count: u32,
    /// Analog carrier locked at the current frequency.
    #[serde(default)]
    pub locked: bool,
}

// ============================================================================
// Events
// ============================================================================

/// Scanner event type discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum EventType {
    ScanBegin = 0x0001,
    LcnInfoData = 0x0002,
    DtvProgData = 0x0003,
    AtvProgData = 0x0004,
    ScanProgress = 0x0005,
    StoreBegin = 0x0006,
    StoreEnd = 0x0007,
    ScanEnd = 0x0008,
    ScanExit = 0x0009,
}

impl EventType {
    pub const ALL: [EventType; 9] = [
        EventType::ScanBegin,
        EventType::LcnInfoData,
        EventType::DtvProgData,
        EventType::AtvProgData,
        EventType::ScanProgress,
        EventType::StoreBegin,
        EventType::StoreEnd,
        EventType::ScanEnd,
        EventType::ScanExit,
    ];

    /// Wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ScanBegin => "SCAN_BEGIN",
            EventType::LcnInfoData => "LCN_INFO_DATA",
            EventType::DtvProgData => "DTV_PROG_DATA",
            EventType::AtvProgData => "ATV_PROG_DATA",
            EventType::ScanProgress => "SCAN_PROGRESS",
            EventType::StoreBegin => "STORE_BEGIN",
            EventType::StoreEnd => "STORE_END",
            EventType::ScanEnd => "SCAN_END",
            EventType::ScanExit => "SCAN_EXIT",
        }
    }

    /// Look up an event type by wire name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    /// Marker events carry no payload.
    pub fn is_marker(&self) -> bool {
        matches!(
            self,
            EventType::StoreBegin | EventType::StoreEnd | EventType::ScanEnd | EventType::ScanExit
        )
    }
}

impl TryFrom<u16> for EventType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| *t as u16 == value)
            .ok_or(value)
    }
}

impl From<EventType> for u16 {
    fn from(value: EventType) -> Self {
        value as u16
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One inbound scanner event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerEvent {
    ScanBegin(ScanBegin),
    LcnInfo(LcnInfoData),
    DtvProgram(DtvProgramData),
    AtvProgram(AtvProgramData),
    Progress(ScanProgress),
    StoreBegin,
    StoreEnd,
    ScanEnd,
    ScanExit,
}

impl ScannerEvent {
    /// Returns the discriminant for this event.
    pub fn event_type(&self) -> EventType {
        match self {
            ScannerEvent::ScanBegin(_) => EventType::ScanBegin,
            ScannerEvent::LcnInfo(_) => EventType::LcnInfoData,
            ScannerEvent::DtvProgram(_) => EventType::DtvProgData,
            ScannerEvent::AtvProgram(_) => EventType::AtvProgData,
            ScannerEvent::Progress(_) => EventType::ScanProgress,
            ScannerEvent::StoreBegin => EventType::StoreBegin,
            ScannerEvent::StoreEnd => EventType::StoreEnd,
            ScannerEvent::ScanEnd => EventType::ScanEnd,
            ScannerEvent::ScanExit => EventType::ScanExit,
        }
    }

    /// Scan and sort mode embedded in the payload, if any.
    ///
    /// Used to initialise a session whose SCAN_BEGIN was lost.
    pub fn modes(&self) -> Option<(ScanMode, SortMode)> {
        match self {
            ScannerEvent::ScanBegin(p) => Some((p.mode, p.sort)),
            ScannerEvent::LcnInfo(p) => Some((p.mode, p.sort)),
            ScannerEvent::DtvProgram(p) => Some((p.mode, p.sort)),
            ScannerEvent::AtvProgram(p) => Some((p.mode, p.sort)),
            ScannerEvent::Progress(p) => Some((p.mode, p.sort)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_roundtrip() {
        for t in EventType::ALL {
            let value: u16 = t.into();
            assert_eq!(EventType::try_from(value), Ok(t));
            assert_eq!(EventType::from_name(t.as_str()), Some(t));
        }
        assert_eq!(EventType::try_from(0x7777), Err(0x7777));
        assert_eq!(EventType::from_name("SCAN_PAUSE"), None);
    }

    #[test]
    fn test_service_kind_from_code() {
        assert_eq!(ServiceKind::from_code(1), ServiceKind::AudioVideo);
        assert_eq!(ServiceKind::from_code(2), ServiceKind::Audio);
        assert_eq!(ServiceKind::from_code(0x0C), ServiceKind::Other);
        assert_eq!(ServiceKind::from_code(-1), ServiceKind::Other);
        assert!(ServiceKind::Other.is_other());
    }

    #[test]
    fn test_scan_mode_predicates() {
        let mode = ScanMode::new(ChannelKind::Digital, ScanMethod::Manual);
        assert!(mode.is_manual());
        assert!(mode.is_digital());
        assert!(!mode.is_auto());
        assert_eq!(mode.to_string(), "digital/manual");
    }

    #[test]
    fn test_markers_have_no_modes() {
        assert!(ScannerEvent::StoreEnd.modes().is_none());
        assert!(EventType::ScanExit.is_marker());
        assert!(!EventType::ScanProgress.is_marker());

        let begin = ScannerEvent::ScanBegin(ScanBegin {
            mode: ScanMode::new(ChannelKind::Analog, ScanMethod::Auto),
            sort: SortMode::Number,
        });
        assert_eq!(begin.event_type(), EventType::ScanBegin);
        assert_eq!(
            begin.modes(),
            Some((
                ScanMode::new(ChannelKind::Analog, ScanMethod::Auto),
                SortMode::Number
            ))
        );
    }
}
