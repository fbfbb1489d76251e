use serde::{Deserialize, Serialize};

use crate::models::{BracketTable, Period};

/// The full set of ISR withholding tariffs: one [`BracketTable`] per
/// [`Period`].
///
/// The period-to-table mapping is five named fields behind a total `match`,
/// so adding a period is a compile error until every consumer handles it.
/// There is deliberately no keyed lookup and no default table: the original
/// behaviour of falling back to the monthly tariff on an unknown key is gone.
///
/// Built once at startup (from the built-in tariffs or a loaded CSV) and
/// shared immutably by every solver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSchedule {
    diario: BracketTable,
    semanal: BracketTable,
    decenal: BracketTable,
    quincenal: BracketTable,
    mensual: BracketTable,
}

impl TaxSchedule {
    pub fn new(
        diario: BracketTable,
        semanal: BracketTable,
        decenal: BracketTable,
        quincenal: BracketTable,
        mensual: BracketTable,
    ) -> Self {
        Self {
            diario,
            semanal,
            decenal,
            quincenal,
            mensual,
        }
    }

    /// The tariff for `period`. Total: every period has a table.
    pub fn table(
        &self,
        period: Period,
    ) -> &BracketTable {
        match period {
            Period::Diario => &self.diario,
            Period::Semanal => &self.semanal,
            Period::Decenal => &self.decenal,
            Period::Quincenal => &self.quincenal,
            Period::Mensual => &self.mensual,
        }
    }
}
