//! Built-in SAT periodic ISR withholding tariffs and the flat IVA rate.
//!
//! One tariff per payment period, eleven brackets each, marginal rates from
//! 1.92% up to 35%. Daily bounds follow the published tariff; the weekly,
//! ten-day and fortnightly bounds are the daily bounds scaled by 7, 10 and 15
//! on the cent grid, and the monthly bounds are the published monthly ones.
//!
//! Base quotas are the cumulative sums of the rate schedule rounded to the
//! centavo. Published tariffs print quotas that drift from their own
//! cumulative sums by up to one centavo per boundary; the derived quotas keep
//! every tariff exactly monotone and continuous.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use precio_core::{Bracket, BracketTable, BracketTableError, TaxSchedule};

/// Flat IVA, SAT general rate (16%).
pub const IVA_RATE: Decimal = dec!(0.16);

fn table(
    rows: &[(Decimal, Option<Decimal>, Decimal, Decimal)],
) -> Result<BracketTable, BracketTableError> {
    BracketTable::new(
        rows.iter()
            .map(|&(lower, upper, quota, rate)| Bracket {
                lower_bound: lower,
                upper_bound: upper,
                base_quota: quota,
                rate_over_excess: rate,
            })
            .collect(),
    )
}

fn tarifa_diaria() -> Result<BracketTable, BracketTableError> {
    table(&[
        (dec!(0.00), Some(dec!(24.54)), dec!(0.00), dec!(1.92)),
        (dec!(24.55), Some(dec!(208.29)), dec!(0.47), dec!(6.40)),
        (dec!(208.30), Some(dec!(366.05)), dec!(12.23), dec!(10.88)),
        (dec!(366.06), Some(dec!(425.52)), dec!(29.39), dec!(16.00)),
        (dec!(425.53), Some(dec!(509.46)), dec!(38.91), dec!(17.92)),
        (dec!(509.47), Some(dec!(1027.52)), dec!(53.95), dec!(21.36)),
        (dec!(1027.53), Some(dec!(1619.51)), dec!(164.61), dec!(23.52)),
        (dec!(1619.52), Some(dec!(3091.90)), dec!(303.85), dec!(30.00)),
        (dec!(3091.91), Some(dec!(4122.54)), dec!(745.57), dec!(32.00)),
        (dec!(4122.55), Some(dec!(12367.62)), dec!(1075.37), dec!(34.00)),
        (dec!(12367.63), None, dec!(3878.70), dec!(35.00)),
    ])
}

fn tarifa_semanal() -> Result<BracketTable, BracketTableError> {
    table(&[
        (dec!(0.00), Some(dec!(171.78)), dec!(0.00), dec!(1.92)),
        (dec!(171.79), Some(dec!(1458.03)), dec!(3.30), dec!(6.40)),
        (dec!(1458.04), Some(dec!(2562.35)), dec!(85.62), dec!(10.88)),
        (dec!(2562.36), Some(dec!(2978.64)), dec!(205.77), dec!(16.00)),
        (dec!(2978.65), Some(dec!(3566.22)), dec!(272.38), dec!(17.92)),
        (dec!(3566.23), Some(dec!(7192.64)), dec!(377.67), dec!(21.36)),
        (dec!(7192.65), Some(dec!(11336.57)), dec!(1152.27), dec!(23.52)),
        (dec!(11336.58), Some(dec!(21643.30)), dec!(2126.92), dec!(30.00)),
        (dec!(21643.31), Some(dec!(28857.78)), dec!(5218.94), dec!(32.00)),
        (dec!(28857.79), Some(dec!(86573.34)), dec!(7527.57), dec!(34.00)),
        (dec!(86573.35), None, dec!(27150.86), dec!(35.00)),
    ])
}

fn tarifa_decenal() -> Result<BracketTable, BracketTableError> {
    table(&[
        (dec!(0.00), Some(dec!(245.40)), dec!(0.00), dec!(1.92)),
        (dec!(245.41), Some(dec!(2082.90)), dec!(4.71), dec!(6.40)),
        (dec!(2082.91), Some(dec!(3660.50)), dec!(122.31), dec!(10.88)),
        (dec!(3660.51), Some(dec!(4255.20)), dec!(293.95), dec!(16.00)),
        (dec!(4255.21), Some(dec!(5094.60)), dec!(389.10), dec!(17.92)),
        (dec!(5094.61), Some(dec!(10275.20)), dec!(539.52), dec!(21.36)),
        (dec!(10275.21), Some(dec!(16195.10)), dec!(1646.10), dec!(23.52)),
        (dec!(16195.11), Some(dec!(30919.00)), dec!(3038.46), dec!(30.00)),
        (dec!(30919.01), Some(dec!(41225.40)), dec!(7455.63), dec!(32.00)),
        (dec!(41225.41), Some(dec!(123676.20)), dec!(10753.68), dec!(34.00)),
        (dec!(123676.21), None, dec!(38786.95), dec!(35.00)),
    ])
}

fn tarifa_quincenal() -> Result<BracketTable, BracketTableError> {
    table(&[
        (dec!(0.00), Some(dec!(368.10)), dec!(0.00), dec!(1.92)),
        (dec!(368.11), Some(dec!(3124.35)), dec!(7.07), dec!(6.40)),
        (dec!(3124.36), Some(dec!(5490.75)), dec!(183.47), dec!(10.88)),
        (dec!(5490.76), Some(dec!(6382.80)), dec!(440.93), dec!(16.00)),
        (dec!(6382.81), Some(dec!(7641.90)), dec!(583.66), dec!(17.92)),
        (dec!(7641.91), Some(dec!(15412.80)), dec!(809.29), dec!(21.36)),
        (dec!(15412.81), Some(dec!(24292.65)), dec!(2469.15), dec!(23.52)),
        (dec!(24292.66), Some(dec!(46378.50)), dec!(4557.69), dec!(30.00)),
        (dec!(46378.51), Some(dec!(61838.10)), dec!(11183.45), dec!(32.00)),
        (dec!(61838.11), Some(dec!(185514.30)), dec!(16130.52), dec!(34.00)),
        (dec!(185514.31), None, dec!(58180.43), dec!(35.00)),
    ])
}

fn tarifa_mensual() -> Result<BracketTable, BracketTableError> {
    table(&[
        (dec!(0.00), Some(dec!(746.04)), dec!(0.00), dec!(1.92)),
        (dec!(746.05), Some(dec!(6332.05)), dec!(14.32), dec!(6.40)),
        (dec!(6332.06), Some(dec!(11128.01)), dec!(371.82), dec!(10.88)),
        (dec!(11128.02), Some(dec!(12935.82)), dec!(893.62), dec!(16.00)),
        (dec!(12935.83), Some(dec!(15487.71)), dec!(1182.87), dec!(17.92)),
        (dec!(15487.72), Some(dec!(31236.49)), dec!(1640.17), dec!(21.36)),
        (dec!(31236.50), Some(dec!(49233.00)), dec!(5004.11), dec!(23.52)),
        (dec!(49233.01), Some(dec!(93993.90)), dec!(9236.89), dec!(30.00)),
        (dec!(93993.91), Some(dec!(125325.20)), dec!(22665.16), dec!(32.00)),
        (dec!(125325.21), Some(dec!(375975.61)), dec!(32691.18), dec!(34.00)),
        (dec!(375975.62), None, dec!(117912.32), dec!(35.00)),
    ])
}

/// The full SAT 2026 withholding schedule: one validated tariff per payment
/// period.
///
/// # Errors
///
/// Returns [`BracketTableError`] if a built-in tariff fails validation (a
/// programming error in this module, surfaced loudly rather than papered
/// over).
pub fn sat_2026() -> Result<TaxSchedule, BracketTableError> {
    Ok(TaxSchedule::new(
        tarifa_diaria()?,
        tarifa_semanal()?,
        tarifa_decenal()?,
        tarifa_quincenal()?,
        tarifa_mensual()?,
    ))
}
