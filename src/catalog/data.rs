//! Standard reference tables.
//!
//! Quiescent figures are typical guitar-amp operating points, not datasheet
//! maxima.

use super::types::*;

#[rustfmt::skip]
pub(super) fn power_tubes() -> Vec<(&'static str, PowerTube)> {
    use TubeKind::*;
    // name, Ia, Ig2, Vg2, kind, Va typical, Va max, Pa max
    let rows: [(&str, f64, f64, f64, TubeKind, f64, f64, f64); 17] = [
        ("EL34",  40.0, 5.0, 250.0, Pentode, 400.0, 500.0, 25.0),
        ("6L6GC", 35.0, 4.0, 250.0, Beam,    400.0, 500.0, 30.0),
        ("EL84",  30.0, 4.5, 250.0, Pentode, 300.0, 400.0, 12.0),
        ("6V6GT", 22.5, 2.5, 250.0, Beam,    350.0, 450.0, 14.0),
        ("KT88",  50.0, 6.0, 300.0, Beam,    450.0, 600.0, 42.0),
        ("KT66",  32.0, 3.5, 250.0, Beam,    400.0, 500.0, 25.0),
        ("6550",  42.0, 5.0, 300.0, Beam,    450.0, 600.0, 35.0),
        ("KT120", 55.0, 7.0, 300.0, Beam,    500.0, 650.0, 60.0),
        ("KT150", 70.0, 8.0, 350.0, Beam,    600.0, 700.0, 70.0),
        ("300B",  60.0, 0.0,   0.0, Triode,  400.0, 450.0, 40.0),
        ("2A3",   45.0, 0.0,   0.0, Triode,  250.0, 300.0, 15.0),
        ("45",    34.0, 0.0,   0.0, Triode,  275.0, 350.0, 10.0),
        ("50",    55.0, 0.0,   0.0, Triode,  400.0, 450.0, 50.0),
        ("6AQ5",  22.0, 3.0, 200.0, Beam,    250.0, 350.0,  9.0),
        ("6BQ5",  30.0, 4.5, 250.0, Pentode, 300.0, 400.0, 12.0),
        ("7189",  35.0, 5.0, 250.0, Pentode, 350.0, 450.0, 14.0),
        ("7591",  35.0, 5.0, 250.0, Beam,    400.0, 500.0, 19.0),
    ];

    rows.iter()
        .map(|&(name, ia, ig2, vg2, kind, va_typ, va_max, pa_max)| {
            (name, PowerTube {
                anode_current: ia,
                screen_current: ig2,
                screen_voltage: vg2,
                kind,
                typical_anode_voltage: va_typ,
                max_anode_voltage: va_max,
                max_dissipation: pa_max,
            })
        })
        .collect()
}

#[rustfmt::skip]
pub(super) fn preamp_tubes() -> Vec<(&'static str, PreampTube)> {
    use TubeKind::*;
    // name, Ia, mu, gm, rp [kΩ], kind, Ra typical, Va max
    let rows: [(&str, f64, f64, f64, f64, TubeKind, f64, f64); 16] = [
        ("12AX7",  1.2, 100.0,  1.6, 62.5, DualTriode, 100_000.0, 300.0),
        ("12AT7",  2.5,  60.0,  5.5, 10.9, DualTriode,  47_000.0, 300.0),
        ("12AU7",  2.2,  20.0,  2.2,  9.1, DualTriode,  22_000.0, 300.0),
        ("12AY7",  1.5,  40.0,  1.8, 22.0, DualTriode,  68_000.0, 300.0),
        ("12AV7",  1.8,  37.0,  2.5, 15.0, DualTriode,  47_000.0, 330.0),
        ("6SL7",   2.3,  70.0,  2.2, 44.0, DualTriode,  47_000.0, 300.0),
        ("6SN7",   7.5,  20.0,  2.6,  7.7, DualTriode,  22_000.0, 300.0),
        ("6SC7",   2.0,  70.0,  2.0, 35.0, DualTriode,  47_000.0, 300.0),
        ("6CG7",   8.0,  20.0,  2.5,  8.0, DualTriode,  22_000.0, 300.0),
        ("EF86",   3.0,   0.0,  2.0,  0.0, Pentode,    220_000.0, 300.0),
        ("EF83",   3.0,   0.0,  1.8,  0.0, Pentode,    220_000.0, 300.0),
        ("6267",   3.0,   0.0,  2.0,  0.0, Pentode,    220_000.0, 300.0),
        ("5751",   1.0,  70.0,  1.2, 58.0, DualTriode, 100_000.0, 300.0),
        ("7025",   1.2, 100.0,  1.6, 62.5, DualTriode, 100_000.0, 300.0),
        ("6DJ8",  15.0,  33.0, 12.5,  2.7, DualTriode,  10_000.0, 300.0),
        ("6922",  15.0,  33.0, 12.5,  2.7, DualTriode,  10_000.0, 300.0),
    ];

    rows.iter()
        .map(|&(name, ia, mu, gm, rp, kind, ra, va_max)| {
            (name, PreampTube {
                anode_current: ia,
                mu,
                gm,
                rp_kohm: rp,
                kind,
                typical_anode_resistor: ra,
                max_anode_voltage: va_max,
            })
        })
        .collect()
}

/// Name of the one topology with a tail resistor in its drop estimate.
pub const LONG_TAIL_PAIR: &str = "Long-tail pair";

#[rustfmt::skip]
pub(super) fn inverters() -> Vec<(&'static str, InverterType)> {
    // name, current [mA], anode resistors, balance, gain
    let rows: [(&str, f64, u32, f64, f64); 5] = [
        (LONG_TAIL_PAIR,       2.5, 2, 0.95, -0.5),
        ("Cathodyne",          1.5, 1, 0.85,  0.8),
        ("Paraphase",          2.0, 2, 0.90, -1.0),
        ("Floating paraphase", 1.8, 2, 0.92, -0.9),
        ("Concertina",         3.0, 3, 0.98, -1.2),
    ];

    rows.iter()
        .map(|&(name, current, anode_resistors, balance, gain)| {
            (name, InverterType { current, anode_resistors, balance, gain })
        })
        .collect()
}

pub const SINGLE_ENDED: &str = "Single-Ended";
pub const PUSH_PULL: &str = "Push-Pull";

#[rustfmt::skip]
pub(super) fn power_configs() -> Vec<(&'static str, PowerConfig)> {
    use OperatingClass::*;
    // name, tube count, class, efficiency, THD [%], power factor
    let rows: [(&str, f64, OperatingClass, f64, f64, f64); 4] = [
        (SINGLE_ENDED,         1.0, A,  0.25, 5.0, 0.5),
        (PUSH_PULL,            2.0, AB, 0.65, 1.0, 0.8),
        ("Parallel Push-Pull", 4.0, AB, 0.65, 0.8, 0.85),
        ("Triode Push-Pull",   2.0, AB, 0.50, 0.5, 0.6),
    ];

    rows.iter()
        .map(|&(name, multiplier, class, efficiency, thd_typical, power_factor)| {
            (name, PowerConfig { multiplier, class, efficiency, thd_typical, power_factor })
        })
        .collect()
}

#[rustfmt::skip]
pub(super) fn rectifiers() -> Vec<(&'static str, Rectifier)> {
    use RectifierKind::*;
    // name, drop [V], kind, regulation, max current [mA]
    let rows: [(&str, f64, RectifierKind, f64, f64); 10] = [
        ("Silicon Bridge",  1.4, SolidState, 0.95, 1000.0),
        ("Schottky Bridge", 0.8, SolidState, 0.98,  500.0),
        ("GZ34 / 5AR4",    17.0, Tube,       0.85,  225.0),
        ("5U4G",           44.0, Tube,       0.75,  175.0),
        ("5Y3",            60.0, Tube,       0.70,  125.0),
        ("5R4",            67.0, Tube,       0.68,  150.0),
        ("274B",           50.0, Tube,       0.72,   85.0),
        ("5Z3",            45.0, Tube,       0.76,  100.0),
        ("83",             22.0, Tube,       0.82,  250.0),
        ("5V4",            25.0, Tube,       0.80,  175.0),
    ];

    rows.iter()
        .map(|&(name, drop, kind, regulation, max_current)| {
            (name, Rectifier { drop, kind, regulation, max_current })
        })
        .collect()
}
