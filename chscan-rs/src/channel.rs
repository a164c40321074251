//! Channel entity and its construction from scanner events.

use chscan_protocol::{
    AtvProgramData, ChannelKind, DtvProgramData, ServiceKind, ServiceTriple,
};
use log::debug;

use crate::text::decode_name;

/// One broadcast service as stored in the channel list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEntity {
    /// Row id; set only for channels read back from the store.
    pub id: Option<i64>,
    pub input_id: String,
    pub kind: ChannelKind,
    pub service_kind: ServiceKind,

    // Identity
    pub original_network_id: u16,
    pub transport_stream_id: u16,
    pub service_id: u16,

    // Numbering
    pub display_number: Option<u32>,
    pub lcn: Option<u32>,
    /// Primary LCN candidate reported for this service.
    pub lcn1: Option<u32>,
    /// Secondary LCN candidate reported for this service.
    pub lcn2: Option<u32>,

    // Tuning
    pub frequency: u32,
    pub modulation: u32,
    pub symbol_rate: u32,
    pub bandwidth: u32,

    // State
    pub browsable: bool,
    pub favourite: bool,
    pub locked: bool,
    pub scrambled: bool,

    // Names
    pub display_name: String,
    /// Name as reported by the demodulator (possibly multilingual).
    pub raw_name: String,

    // Elementary streams (DTV)
    pub pcr_pid: Option<u16>,
    pub video_pid: Option<u16>,
    pub video_format: Option<i32>,
    pub audio_pids: Vec<u16>,
    pub audio_formats: Vec<i32>,
    pub audio_langs: Vec<String>,
    pub subtitle_pids: Vec<u16>,
    pub subtitle_langs: Vec<String>,

    // Standards (ATV)
    pub video_std: i32,
    pub audio_std: i32,
}

/// Per-channel inputs to the factory that come from the session rather than
/// from the event itself.
#[derive(Debug, Clone, Copy)]
pub struct ChannelContext<'a> {
    pub input_id: &'a str,
    /// Provisional display number taken from the session cursor.
    pub number: u32,
    pub placeholder_name: &'a str,
    pub preferred_language: Option<&'a str>,
    pub atv_name_prefix: &'a str,
}

impl ChannelEntity {
    /// Build a digital channel from DTV program data.
    pub fn from_dtv(data: &DtvProgramData, ctx: &ChannelContext<'_>) -> Self {
        let display_name = match decode_name(&data.raw_name, ctx.preferred_language) {
            Ok(name) => name,
            Err(e) => {
                debug!(
                    "Service name decode failed for {}: {}; using placeholder",
                    data.triple(),
                    e
                );
                ctx.placeholder_name.to_string()
            }
        };

        Self {
            id: None,
            input_id: ctx.input_id.to_string(),
            kind: ChannelKind::Digital,
            service_kind: ServiceKind::from_code(data.service_type),
            original_network_id: data.original_network_id,
            transport_stream_id: data.transport_stream_id,
            service_id: data.service_id,
            display_number: Some(ctx.number),
            lcn: None,
            lcn1: None,
            lcn2: None,
            frequency: data.frequency,
            modulation: data.modulation,
            symbol_rate: data.symbol_rate,
            bandwidth: data.bandwidth,
            browsable: true,
            favourite: false,
            locked: false,
            scrambled: data.scrambled,
            display_name,
            raw_name: data.raw_name.clone(),
            pcr_pid: data.pcr_pid,
            video_pid: data.video_pid,
            video_format: data.video_format,
            audio_pids: data.audio_pids.clone(),
            audio_formats: data.audio_formats.clone(),
            audio_langs: data.audio_langs.clone(),
            subtitle_pids: data.subtitle_pids.clone(),
            subtitle_langs: data.subtitle_langs.clone(),
            video_std: 0,
            audio_std: 0,
        }
    }

    /// Build an analog channel from ATV program data.
    pub fn from_atv(data: &AtvProgramData, ctx: &ChannelContext<'_>) -> Self {
        let display_name = format!("{}-{}", ctx.atv_name_prefix, ctx.number);

        Self {
            id: None,
            input_id: ctx.input_id.to_string(),
            kind: ChannelKind::Analog,
            service_kind: ServiceKind::AudioVideo,
            original_network_id: 0,
            transport_stream_id: 0,
            service_id: 0,
            display_number: Some(ctx.number),
            lcn: None,
            lcn1: None,
            lcn2: None,
            frequency: data.frequency,
            modulation: 0,
            symbol_rate: 0,
            bandwidth: 0,
            browsable: true,
            favourite: false,
            locked: false,
            scrambled: false,
            raw_name: display_name.clone(),
            display_name,
            pcr_pid: None,
            video_pid: None,
            video_format: None,
            audio_pids: Vec::new(),
            audio_formats: Vec::new(),
            audio_langs: Vec::new(),
            subtitle_pids: Vec::new(),
            subtitle_langs: Vec::new(),
            video_std: data.video_std,
            audio_std: data.audio_std,
        }
    }

    /// Service identity triple.
    pub fn triple(&self) -> ServiceTriple {
        ServiceTriple::new(
            self.original_network_id,
            self.transport_stream_id,
            self.service_id,
        )
    }

    pub fn is_digital(&self) -> bool {
        self.kind == ChannelKind::Digital
    }

    /// Whether both entities describe the same broadcast service.
    ///
    /// Digital services compare by identity triple. Analog carriers have no
    /// service identity and compare by frequency.
    pub fn same_service(&self, other: &ChannelEntity) -> bool {
        match (self.kind, other.kind) {
            (ChannelKind::Digital, ChannelKind::Digital) => self.triple() == other.triple(),
            (ChannelKind::Analog, ChannelKind::Analog) => self.frequency == other.frequency,
            _ => false,
        }
    }

    /// Carry the row id and user preferences over from a stored version of
    /// the same service.
    pub fn inherit_from(&mut self, stored: &ChannelEntity) {
        self.id = stored.id;
        self.favourite = stored.favourite;
        self.locked = stored.locked;
    }

    /// Short label for log lines.
    pub fn label(&self) -> String {
        match self.kind {
            ChannelKind::Digital => format!("{} ({})", self.display_name, self.triple()),
            ChannelKind::Analog => format!("{} ({} kHz)", self.display_name, self.frequency),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chscan_protocol::{ScanMethod, ScanMode, SortMode};

    pub(crate) fn dtv_data(onid: u16, tsid: u16, sid: u16, frequency: u32) -> DtvProgramData {
        DtvProgramData {
            mode: ScanMode::new(ChannelKind::Digital, ScanMethod::Auto),
            sort: SortMode::Number,
            frequency,
            modulation: 3,
            symbol_rate: 6875,
            bandwidth: 8,
            original_network_id: onid,
            transport_stream_id: tsid,
            service_id: sid,
            service_type: 1,
            raw_name: format!("eng=Service {}", sid),
            scrambled: false,
            pcr_pid: Some(100),
            video_pid: Some(101),
            video_format: Some(2),
            audio_pids: vec![102, 103],
            audio_formats: vec![3, 3],
            audio_langs: vec!["eng".to_string(), "fra".to_string()],
            subtitle_pids: vec![],
            subtitle_langs: vec![],
        }
    }

    pub(crate) fn ctx(number: u32) -> ChannelContext<'static> {
        ChannelContext {
            input_id: "tuner0",
            number,
            placeholder_name: "Unknown",
            preferred_language: None,
            atv_name_prefix: "ATV",
        }
    }

    #[test]
    fn test_from_dtv() {
        let data = dtv_data(1, 2, 3, 474_000);
        let ch = ChannelEntity::from_dtv(&data, &ctx(7));

        assert_eq!(ch.kind, ChannelKind::Digital);
        assert_eq!(ch.service_kind, ServiceKind::AudioVideo);
        assert_eq!(ch.triple(), ServiceTriple::new(1, 2, 3));
        assert_eq!(ch.display_number, Some(7));
        assert_eq!(ch.display_name, "Service 3");
        assert_eq!(ch.raw_name, "eng=Service 3");
        assert_eq!(ch.audio_pids, vec![102, 103]);
        assert_eq!(ch.symbol_rate, 6875);
        assert!(ch.browsable && !ch.favourite && !ch.locked);
    }

    #[test]
    fn test_from_dtv_service_kinds_and_placeholder() {
        let mut data = dtv_data(1, 2, 3, 474_000);
        data.service_type = 2;
        data.raw_name = String::new();
        let ch = ChannelEntity::from_dtv(&data, &ctx(1));
        assert_eq!(ch.service_kind, ServiceKind::Audio);
        assert_eq!(ch.display_name, "Unknown");

        data.service_type = 0x0C;
        let ch = ChannelEntity::from_dtv(&data, &ctx(1));
        assert_eq!(ch.service_kind, ServiceKind::Other);
    }

    #[test]
    fn test_from_atv() {
        let data = AtvProgramData {
            mode: ScanMode::new(ChannelKind::Analog, ScanMethod::Auto),
            sort: SortMode::Number,
            frequency: 175_250,
            video_std: 1,
            audio_std: 4,
            is_auto_std: true,
        };
        let ch = ChannelEntity::from_atv(&data, &ctx(12));

        assert_eq!(ch.kind, ChannelKind::Analog);
        assert_eq!(ch.service_kind, ServiceKind::AudioVideo);
        assert_eq!(ch.display_name, "ATV-12");
        assert_eq!(ch.display_number, Some(12));
        assert_eq!((ch.video_std, ch.audio_std), (1, 4));
    }

    #[test]
    fn test_same_service() {
        let a = ChannelEntity::from_dtv(&dtv_data(1, 2, 3, 474_000), &ctx(1));
        let moved = ChannelEntity::from_dtv(&dtv_data(1, 2, 3, 482_000), &ctx(2));
        let other = ChannelEntity::from_dtv(&dtv_data(1, 2, 4, 474_000), &ctx(3));
        assert!(a.same_service(&moved));
        assert!(!a.same_service(&other));

        let atv = AtvProgramData {
            mode: ScanMode::new(ChannelKind::Analog, ScanMethod::Auto),
            sort: SortMode::Number,
            frequency: 474_000,
            video_std: 0,
            audio_std: 0,
            is_auto_std: false,
        };
        let analog = ChannelEntity::from_atv(&atv, &ctx(4));
        assert!(!analog.same_service(&a));
        assert!(analog.same_service(&ChannelEntity::from_atv(&atv, &ctx(5))));
    }
}
