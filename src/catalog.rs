//! Human-readable labels for KOI feature identifiers.
//!
//! Display only: nothing in the pipeline depends on these names.

const DISPLAY_NAMES: &[(&str, &str)] = &[
    ("kepid", "KepID"),
    ("kepoi_name", "KOI Name"),
    ("kepler_name", "Kepler Name"),
    ("koi_disposition", "Exoplanet Archive Disposition"),
    ("koi_pdisposition", "Disposition Using Kepler Data"),
    ("koi_score", "Disposition Score"),
    ("koi_fpflag_nt", "Not Transit-Like False Positive Flag"),
    ("koi_fpflag_ss", "Stellar Eclipse False Positive Flag"),
    ("koi_fpflag_co", "Centroid Offset False Positive Flag"),
    ("koi_fpflag_ec", "Ephemeris Contamination False Positive Flag"),
    ("koi_period", "Orbital Period [days]"),
    ("koi_time0bk", "Transit Epoch [BKJD]"),
    ("koi_duration", "Transit Duration [hrs]"),
    ("koi_depth", "Transit Depth [ppm]"),
    ("koi_prad", "Planetary Radius [Earth radii]"),
    ("koi_teq", "Equilibrium Temperature [K]"),
    ("koi_insol", "Insolation Flux [Earth flux]"),
    ("koi_model_snr", "Transit Signal-to-Noise"),
    ("koi_steff", "Stellar Effective Temperature [K]"),
    ("koi_slogg", "Stellar Surface Gravity [log10(cm/s^2)]"),
    ("koi_srad", "Stellar Radius [Solar radii]"),
    ("ra", "RA [decimal degrees]"),
    ("dec", "Dec [decimal degrees]"),
    ("koi_kepmag", "Kepler-band [mag]"),
];

/// Catalog label for `feature`, if it has one.
pub fn lookup(feature: &str) -> Option<&'static str> {
    DISPLAY_NAMES
        .iter()
        .find_map(|&(id, label)| (id == feature).then_some(label))
}

/// Catalog label, falling back to the raw identifier.
pub fn display_name(feature: &str) -> &str {
    lookup(feature).unwrap_or(feature)
}
