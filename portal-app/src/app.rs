//! Portal route table and router assembly.

use crate::config::PortalConfig;
use crate::model::PortalData;
use crate::pages::{EquipmentPage, HomePage, LaboratoryList, ReservationsPage, SyncState};
use portal_nav::{
    AppContext, Entity, Route, RouteTable, Router, TerminalTitle, TitleFormatter, TitleHook,
    ViewProvider,
};

/// Every page the portal serves. Pages not needed at startup are deferred.
pub fn routes(data: Entity<PortalData>) -> portal_nav::Result<RouteTable> {
    let home = {
        let data = data.clone();
        ViewProvider::deferred(move || {
            let data = data.clone();
            async move { Ok(HomePage::new(data)) }
        })
    };
    let equipment = {
        let data = data.clone();
        let sync = Entity::new(SyncState::default());
        ViewProvider::deferred(move || {
            let (data, sync) = (data.clone(), sync.clone());
            async move { Ok(EquipmentPage::new(data, sync)) }
        })
    };
    let reservations = {
        let data = data.clone();
        ViewProvider::deferred(move || {
            let data = data.clone();
            async move { Ok(ReservationsPage::new(data)) }
        })
    };

    RouteTable::builder()
        .route(Route::new("/", "Home", home)?.with_title("首页"))
        .route(
            Route::new("/laboratories", "LaboratoryList", ViewProvider::eager(LaboratoryList::new(data)))?
                .with_title("实验室管理"),
        )
        .route(Route::new("/equipment", "Equipment", equipment)?.with_title("设备管理"))
        .route(Route::new("/reservations", "Reservations", reservations)?.with_title("预约管理"))
        .build()
}

fn formatter(config: &PortalConfig) -> TitleFormatter {
    TitleFormatter::new(config.app.name.clone()).with_separator(config.app.title_separator.clone())
}

pub fn build_router(config: &PortalConfig, cx: &AppContext) -> anyhow::Result<Router> {
    let data = cx.new_entity(PortalData::sample());
    let table = routes(data)?;
    tracing::info!(routes = table.len(), "route table built");

    let mut hook = TitleHook::new(formatter(config)).with_sink(cx.title().clone());
    if config.ui.terminal_title {
        hook = hook.with_sink(TerminalTitle);
    }

    Ok(Router::new(table)
        .with_max_history(config.router.max_history)
        .with_hook(hook))
}
