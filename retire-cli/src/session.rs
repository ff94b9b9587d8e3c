//! Per-process state: the fiscal settings in effect and the hypothetical
//! overlay built on top of them.

use chrono::{Datelike, Local};
use retire_core::calculations::{EmployeeSnapshot, PeriodSummary, SummaryAggregator};
use retire_core::period::ReportingPeriod;
use retire_core::scenario::{HypotheticalEdit, HypotheticalOverlay, ScenarioReport};
use retire_core::{
    FiscalSettings, IncomeFilter, RepositoryError, RetirementRepository, TaxableProfit,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::error::AppError;

/// One `--set ID:FIELD=VALUE` edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayEdit {
    pub employee_id: i64,
    pub edit: HypotheticalEdit,
}

pub struct Session {
    settings: FiscalSettings,
    overlay: HypotheticalOverlay,
}

impl Session {
    pub fn new(settings: FiscalSettings) -> Self {
        Self {
            settings,
            overlay: HypotheticalOverlay::new(),
        }
    }

    /// Starts from the stored settings row, or from defaults for the current
    /// calendar year when none has been saved.
    pub async fn load(repo: &dyn RetirementRepository) -> Result<Self, AppError> {
        let settings = match repo.get_settings().await {
            Ok(settings) => settings,
            Err(RepositoryError::NotFound) => FiscalSettings::with_year(Local::now().year()),
            Err(e) => return Err(e.into()),
        };
        debug!(
            year = settings.selected_year,
            percentage = %settings.contribution_percentage,
            "loaded settings"
        );
        Ok(Self::new(settings))
    }

    pub fn settings(&self) -> &FiscalSettings {
        &self.settings
    }

    pub fn overlay(&self) -> &HypotheticalOverlay {
        &self.overlay
    }

    pub fn privacy(&self) -> bool {
        self.settings.privacy_mode
    }

    /// The explicit `(start, end)` range, or the selected fiscal year.
    pub fn period(
        &self,
        range: Option<(&str, &str)>,
    ) -> Result<ReportingPeriod, AppError> {
        Ok(ReportingPeriod::resolve(self.settings.selected_year, range)?)
    }

    /// Actual per-employee totals for the period. Net spend uses the taxable
    /// profit recorded for the selected fiscal year.
    pub async fn summary(
        &self,
        repo: &dyn RetirementRepository,
        range: Option<(&str, &str)>,
    ) -> Result<PeriodSummary, AppError> {
        let period = self.period(range)?;
        let employees = repo.list_employees().await?;
        let income = repo
            .list_income(IncomeFilter::default().within(period.window))
            .await?;
        let taxable_profit = repo.get_taxable_profit(self.settings.selected_year).await?;

        let summary = SummaryAggregator::new(self.settings.contribution_percentage).aggregate(
            period,
            &employees,
            &income,
            taxable_profit,
        )?;
        Ok(summary)
    }

    /// Seeds the overlay from the actual summary, applies `edits` in order and
    /// reports actual against hypothetical.
    ///
    /// The edits are all-or-nothing: if any is rejected, none of the batch
    /// is kept.
    pub async fn scenario(
        &mut self,
        repo: &dyn RetirementRepository,
        range: Option<(&str, &str)>,
        edits: &[OverlayEdit],
    ) -> Result<ScenarioReport, AppError> {
        let actual = self.summary(repo, range).await?;
        self.overlay.seed_from(&actual);

        let mut overlay = self.overlay.clone();

        for OverlayEdit { employee_id, edit } in edits {
            if actual.row(*employee_id).is_none() {
                return Err(AppError::NotFound(format!("employee {employee_id}")));
            }
            overlay.apply_edit(*employee_id, *edit, self.settings.contribution_percentage)?;
        }

        self.overlay = overlay;
        Ok(ScenarioReport::build(actual, &self.overlay))
    }

    /// Validates and stores `settings`. Returns true when the overlay was
    /// discarded because the rate or fiscal year changed.
    pub async fn update_settings(
        &mut self,
        repo: &dyn RetirementRepository,
        settings: FiscalSettings,
    ) -> Result<bool, AppError> {
        settings.validate()?;
        repo.update_settings(&settings).await?;

        let reset = self.settings.changes_scenario_basis(&settings) && !self.overlay.is_empty();
        if reset {
            info!(
                discarded = self.overlay.len(),
                year = settings.selected_year,
                percentage = %settings.contribution_percentage,
                "settings changed, clearing hypothetical scenario"
            );
            self.overlay.clear();
        }
        self.settings = settings;
        Ok(reset)
    }

    /// Deletes the employee with all their records and drops their overlay
    /// entry.
    pub async fn delete_employee(
        &mut self,
        repo: &dyn RetirementRepository,
        employee_id: i64,
    ) -> Result<(), AppError> {
        repo.delete_employee(employee_id)
            .await
            .map_err(AppError::not_found(format!("employee {employee_id}")))?;
        if self.overlay.remove(employee_id).is_some() {
            debug!(employee_id, "dropped hypothetical entry of deleted employee");
        }
        Ok(())
    }

    /// Side-by-side totals and attendance over the selected fiscal year.
    pub async fn compare(
        &self,
        repo: &dyn RetirementRepository,
        first: i64,
        second: i64,
    ) -> Result<(EmployeeSnapshot, EmployeeSnapshot), AppError> {
        Ok((self.snapshot(repo, first).await?, self.snapshot(repo, second).await?))
    }

    async fn snapshot(
        &self,
        repo: &dyn RetirementRepository,
        employee_id: i64,
    ) -> Result<EmployeeSnapshot, AppError> {
        let window = self.settings.fiscal_window()?;
        let employee = repo
            .get_employee(employee_id)
            .await
            .map_err(AppError::not_found(format!("employee {employee_id}")))?;
        let income = repo
            .list_income(IncomeFilter::for_employee(employee_id).within(window))
            .await?;
        let attendance = repo.list_attendance(employee_id, Some(window)).await?;

        let snapshot = EmployeeSnapshot::compute(
            &employee,
            &income,
            &attendance,
            window,
            self.settings.contribution_percentage,
        )?;
        Ok(snapshot)
    }

    /// Stores the taxable profit for `year`, defaulting to the selected year.
    pub async fn record_profit(
        &self,
        repo: &dyn RetirementRepository,
        year: Option<i32>,
        total_profit: Decimal,
    ) -> Result<TaxableProfit, AppError> {
        let profit = TaxableProfit {
            year: year.unwrap_or(self.settings.selected_year),
            total_profit,
        };
        profit.validate()?;
        repo.set_taxable_profit(&profit).await?;
        info!(year = profit.year, total_profit = %profit.total_profit, "recorded taxable profit");
        Ok(profit)
    }
}
