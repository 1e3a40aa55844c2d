// Team names, franchise identities and three-letter codes.

use crate::season::Season;

/// Decorations the source appends to names (playoff teams, Hall of Famers).
const MARKERS: &[char] = &['*', '†', '‡'];

/// Display-name variants found in older standings pages, mapped to the
/// proper name used by the code table.
const NAME_VARIANTS: &[(&str, &str)] = &[
    ("Chicago Black Hawks", "Chicago Blackhawks"),
    ("St Louis Blues", "St. Louis Blues"),
    ("Montréal Canadiens", "Montreal Canadiens"),
    ("Mighty Ducks Of Anaheim", "Mighty Ducks of Anaheim"),
    ("Anaheim Mighty Ducks", "Mighty Ducks of Anaheim"),
    ("Utah HC", "Utah Hockey Club"),
];

/// The name shared by two unrelated franchises.
const SHARED_JETS_NAME: &str = "Winnipeg Jets";

/// Identity of the 1979-1996 franchise that later became the Coyotes.
pub const ORIGINAL_JETS: &str = "Winnipeg Jets (1979)";

/// First season of the current Winnipeg franchise (relocated from Atlanta).
pub const JETS_RETURN_START_YEAR: i32 = 2011;

/// Every franchise identity since 1979-80, keyed by normalized full name.
const TEAM_CODES: &[(&str, &str)] = &[
    ("Anaheim Ducks", "ANA"),
    ("Mighty Ducks of Anaheim", "MDA"),
    ("Arizona Coyotes", "ARI"),
    ("Phoenix Coyotes", "PHX"),
    ("Atlanta Flames", "AFM"),
    ("Atlanta Thrashers", "ATL"),
    ("Boston Bruins", "BOS"),
    ("Buffalo Sabres", "BUF"),
    ("Calgary Flames", "CGY"),
    ("Carolina Hurricanes", "CAR"),
    ("Chicago Blackhawks", "CHI"),
    ("Colorado Avalanche", "COL"),
    ("Colorado Rockies", "CLR"),
    ("Columbus Blue Jackets", "CBJ"),
    ("Dallas Stars", "DAL"),
    ("Detroit Red Wings", "DET"),
    ("Edmonton Oilers", "EDM"),
    ("Florida Panthers", "FLA"),
    ("Hartford Whalers", "HAR"),
    ("Los Angeles Kings", "LAK"),
    ("Minnesota North Stars", "MNS"),
    ("Minnesota Wild", "MIN"),
    ("Montreal Canadiens", "MTL"),
    ("Nashville Predators", "NSH"),
    ("New Jersey Devils", "NJD"),
    ("New York Islanders", "NYI"),
    ("New York Rangers", "NYR"),
    ("Ottawa Senators", "OTT"),
    ("Philadelphia Flyers", "PHI"),
    ("Pittsburgh Penguins", "PIT"),
    ("Quebec Nordiques", "QUE"),
    ("San Jose Sharks", "SJS"),
    ("Seattle Kraken", "SEA"),
    ("St. Louis Blues", "STL"),
    ("Tampa Bay Lightning", "TBL"),
    ("Toronto Maple Leafs", "TOR"),
    ("Utah Hockey Club", "UTA"),
    ("Utah Mammoth", "UTA"),
    ("Vancouver Canucks", "VAN"),
    ("Vegas Golden Knights", "VEG"),
    ("Washington Capitals", "WSH"),
    (ORIGINAL_JETS, "WIN"),
    ("Winnipeg Jets", "WPG"),
];

/// Remove trailing decoration marks and surrounding whitespace.
pub fn strip_markers(name: &str) -> String {
    name.trim()
        .trim_end_matches(|c: char| MARKERS.contains(&c) || c.is_whitespace())
        .to_string()
}

/// Replace a known irregular display name with its proper form.
pub fn canonical_name(name: &str) -> &str {
    NAME_VARIANTS
        .iter()
        .find(|(variant, _)| *variant == name)
        .map(|(_, proper)| *proper)
        .unwrap_or(name)
}

/// Logical franchise identity for a display name in a given season.
///
/// "Winnipeg Jets" before the current franchise arrived refers to the
/// original club; every other name is its own identity.
pub fn franchise_identity(name: &str, season: Season) -> &str {
    if name == SHARED_JETS_NAME && season.start_year() < JETS_RETURN_START_YEAR {
        ORIGINAL_JETS
    } else {
        name
    }
}

/// Code for a normalized franchise identity, if it is in the closed table.
pub fn team_code(identity: &str) -> Option<&'static str> {
    TEAM_CODES
        .iter()
        .find(|(name, _)| *name == identity)
        .map(|(_, code)| *code)
}

/// Full name-to-code resolution for a raw standings display name.
pub fn resolve_team_code(display_name: &str, season: Season) -> Option<&'static str> {
    let stripped = strip_markers(display_name);
    let identity = franchise_identity(canonical_name(&stripped), season);
    team_code(identity)
}

/// Whether `code` belongs to the fixed code set.
pub fn is_known_code(code: &str) -> bool {
    TEAM_CODES.iter().any(|(_, c)| *c == code)
}

/// Whether `code` is the "played for several teams" placeholder
/// (`TOT`, or `2TM`, `3TM`, ... in newer exports).
pub fn is_multi_team(code: &str) -> bool {
    if code == "TOT" {
        return true;
    }
    let bytes = code.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && &bytes[1..] == b"TM"
}
