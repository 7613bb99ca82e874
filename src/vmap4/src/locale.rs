//! Client locale enumeration and archive locale masks.
//!
//! The client ships one archive per installation with locale-partitioned
//! content; opening it requires the locale's flag mask. Locale ids follow the
//! client's own enumeration order, which contains a reserved slot that never
//! corresponds to installed content.

/// Archive locale bitmask flags.
pub mod flags {
    pub const EN_US: u32 = 0x0000_0002;
    pub const KO_KR: u32 = 0x0000_0004;
    pub const FR_FR: u32 = 0x0000_0010;
    pub const DE_DE: u32 = 0x0000_0020;
    pub const ZH_CN: u32 = 0x0000_0040;
    pub const ES_ES: u32 = 0x0000_0080;
    pub const ZH_TW: u32 = 0x0000_0100;
    pub const EN_GB: u32 = 0x0000_0200;
    pub const ES_MX: u32 = 0x0000_1000;
    pub const RU_RU: u32 = 0x0000_2000;
    pub const PT_BR: u32 = 0x0000_4000;
    pub const IT_IT: u32 = 0x0000_8000;
    pub const PT_PT: u32 = 0x0001_0000;
}

/// Regional client variant, in client enumeration order.
///
/// Index 9 is a reserved slot (`None`) that never names installed content and
/// is skipped during locale negotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    EnUs,
    KoKr,
    FrFr,
    DeDe,
    ZhCn,
    ZhTw,
    EsEs,
    EsMx,
    RuRu,
    None,
    PtBr,
    ItIt,
}

impl Locale {
    /// All locales in negotiation order (the reserved slot included; callers
    /// skip it).
    pub const ALL: [Locale; 12] = [
        Locale::EnUs,
        Locale::KoKr,
        Locale::FrFr,
        Locale::DeDe,
        Locale::ZhCn,
        Locale::ZhTw,
        Locale::EsEs,
        Locale::EsMx,
        Locale::RuRu,
        Locale::None,
        Locale::PtBr,
        Locale::ItIt,
    ];

    /// Locale name as it appears in client file names
    /// (`component.wow-enUS.txt`).
    pub fn name(self) -> &'static str {
        match self {
            Locale::EnUs => "enUS",
            Locale::KoKr => "koKR",
            Locale::FrFr => "frFR",
            Locale::DeDe => "deDE",
            Locale::ZhCn => "zhCN",
            Locale::ZhTw => "zhTW",
            Locale::EsEs => "esES",
            Locale::EsMx => "esMX",
            Locale::RuRu => "ruRU",
            Locale::None => "none",
            Locale::PtBr => "ptBR",
            Locale::ItIt => "itIT",
        }
    }

    /// Archive flag mask for this locale. Paired markets share one mask
    /// (enUS/enGB, ptBR/ptPT). The reserved slot has no mask.
    pub fn casc_flags(self) -> u32 {
        match self {
            Locale::EnUs => flags::EN_US | flags::EN_GB,
            Locale::KoKr => flags::KO_KR,
            Locale::FrFr => flags::FR_FR,
            Locale::DeDe => flags::DE_DE,
            Locale::ZhCn => flags::ZH_CN,
            Locale::ZhTw => flags::ZH_TW,
            Locale::EsEs => flags::ES_ES,
            Locale::EsMx => flags::ES_MX,
            Locale::RuRu => flags::RU_RU,
            Locale::None => 0,
            Locale::PtBr => flags::PT_BR | flags::PT_PT,
            Locale::ItIt => flags::IT_IT,
        }
    }

    /// True for the reserved enumeration slot.
    pub fn is_reserved(self) -> bool {
        self == Locale::None
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_slot_position() {
        assert_eq!(Locale::ALL[9], Locale::None);
        assert!(Locale::ALL[9].is_reserved());
        assert_eq!(Locale::None.casc_flags(), 0);
    }

    #[test]
    fn test_negotiation_order_starts_with_enus() {
        assert_eq!(Locale::ALL[0], Locale::EnUs);
        assert_eq!(Locale::ALL[0].name(), "enUS");
    }

    #[test]
    fn test_paired_market_masks() {
        assert_eq!(Locale::EnUs.casc_flags(), flags::EN_US | flags::EN_GB);
        assert_eq!(Locale::PtBr.casc_flags(), flags::PT_BR | flags::PT_PT);
    }
}
