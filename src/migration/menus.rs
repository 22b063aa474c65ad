use super::context::MigrationContext;
use crate::error::MigrationResult;
use crate::models::{group_rows_by, MenuLocations, PolylangSettings, TranslationGroup};
use crate::status::MigrationState;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Attach each translated menu group to the theme location that displays one
/// of its members. Returns the number of groups placed.
///
/// Locations without a menu (id 0) are ignored. When several locations show
/// members of the same group the last location in name order wins.
pub fn assign_menu_locations(
    settings: &mut PolylangSettings,
    locations: &MenuLocations,
    groups: &BTreeMap<i64, TranslationGroup>,
) -> usize {
    let mut group_locations: BTreeMap<i64, &str> = BTreeMap::new();
    for (location, menu_id) in &locations.locations {
        if *menu_id == 0 {
            continue;
        }
        for (trid, group) in groups {
            if group.contains_object(*menu_id) {
                group_locations.insert(*trid, location);
            }
        }
    }

    for (trid, location) in &group_locations {
        if let Some(group) = groups.get(trid) {
            for (language, menu_id) in group.iter() {
                settings.set_nav_menu(&locations.theme, location, language, menu_id);
            }
        }
    }
    group_locations.len()
}

/// Migrates translated navigation menus into the target menu locations.
pub struct MenusStage<'a> {
    ctx: &'a MigrationContext,
}

impl<'a> MenusStage<'a> {
    pub fn new(ctx: &'a MigrationContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> MigrationResult<()> {
        self.ctx.status.set(MigrationState::Menus).await?;

        let locations = match self.ctx.target.nav_menu_locations().await? {
            Some(locations) if !locations.locations.is_empty() => locations,
            _ => {
                debug!("No menu locations, skipping menus");
                return Ok(());
            }
        };
        let rows = self.ctx.source.menu_translations().await?;
        let groups = group_rows_by(&rows, |trid| trid);
        if groups.is_empty() {
            debug!("No translated menus, skipping menus");
            return Ok(());
        }

        let mut settings = self.ctx.target.settings().await?;
        let placed = assign_menu_locations(&mut settings, &locations, &groups);
        self.ctx.target.save_settings(&settings).await?;

        info!(
            run_id = %self.ctx.run_id(),
            theme = %locations.theme,
            groups = placed,
            "Menus migrated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{group_rows_by, TranslationRow};

    #[test]
    fn test_groups_follow_their_location() {
        let groups = group_rows_by(
            &[
                TranslationRow::new(1, "en", 11),
                TranslationRow::new(1, "fr", 12),
                TranslationRow::new(2, "en", 21),
                TranslationRow::new(3, "en", 31),
            ],
            |trid| trid,
        );
        let locations = MenuLocations {
            theme: "twentytwenty".into(),
            locations: [("footer", 21), ("primary", 11), ("social", 0)]
                .into_iter()
                .map(|(l, id)| (l.to_string(), id))
                .collect(),
        };

        let mut settings = PolylangSettings::default();
        assert_eq!(assign_menu_locations(&mut settings, &locations, &groups), 2);
        assert_eq!(settings.nav_menu("twentytwenty", "primary", "en"), Some(11));
        assert_eq!(settings.nav_menu("twentytwenty", "primary", "fr"), Some(12));
        assert_eq!(settings.nav_menu("twentytwenty", "footer", "en"), Some(21));
        assert_eq!(settings.nav_menu("twentytwenty", "social", "en"), None);
    }
}
