use crate::error::Result;
use crate::models::{DisciplineRules, UpdateRulesInput};
use crate::store::RecordStore;

pub fn get_rules<S: RecordStore + ?Sized>(store: &S) -> Result<DisciplineRules> {
    store.get_rules()
}

pub fn update_rules<S: RecordStore + ?Sized>(
    store: &S,
    update: UpdateRulesInput,
) -> Result<DisciplineRules> {
    let rules = update.apply_to(store.get_rules()?);
    rules.validate()?;

    if rules.target_below_loss() {
        log::warn!(
            "Profit target {}% is not above max loss {}%",
            rules.daily_profit_target_percent,
            rules.max_daily_loss_percent
        );
    }

    store.save_rules(&rules)?;
    log::info!(
        "Discipline rules updated: max loss {}%, target {}%",
        rules.max_daily_loss_percent,
        rules.daily_profit_target_percent
    );

    get_rules(store)
}

pub fn reset_rules<S: RecordStore + ?Sized>(store: &S) -> Result<DisciplineRules> {
    store.save_rules(&DisciplineRules::default())?;
    get_rules(store)
}
