use campus::prelude::*;
use campus::{NoticeLevel, Transport};

// ---------------------------------------------------------------------------
// Console effects
// ---------------------------------------------------------------------------

/// Prints notices to stderr in place of toasts.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, message: &str) {
        eprintln!("[{level:?}] {message}");
    }
}

/// Prints the routes the portal would navigate to.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, path: &str) {
        eprintln!("-> {path}");
    }
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

/// Fetches the first page of `endpoint`, optionally narrowed by `search`.
async fn first_page<T: Transport>(
    portal: &Portal<T>,
    endpoint: &str,
    search: Option<&str>,
) -> ListState {
    let mut filters = Filters::new();
    if let Some(search) = search {
        filters.insert("search".to_string(), search.into());
    }
    let list = portal.list(
        portal
            .list_options(endpoint)
            .filters(filters)
            .fetch_on_construction(false),
    );
    list.fetch_data().await;
    list.snapshot()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    campus::init_tracing();

    let mut args = std::env::args().skip(1);
    let endpoint = args.next().unwrap_or_else(|| "/majors".to_string());
    let search = args.next();

    let config = PortalConfig::from_env()?;
    eprintln!("campus portal demo against {}", config.api_url());

    let portal = Portal::builder(config)
        .notifier(Arc::new(ConsoleNotifier))
        .navigator(Arc::new(ConsoleNavigator))
        .build()?;
    let state = portal.bootstrap().await?;
    tracing::info!(%state, role = ?portal.role(), "session ready");

    for item in portal.navigation() {
        eprintln!("  {} ({})", item.title, item.path);
    }
    if let GuardOutcome::Redirect(to) = portal.guard(&endpoint) {
        eprintln!("a browser would be sent to {to}");
    }

    let page = first_page(&portal, &endpoint, search.as_deref()).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "endpoint": endpoint,
            "page": page.current_page,
            "from": page.from,
            "total": page.total,
            "pages": page.page_count(),
            "items": page.items,
        }))?
    );

    portal.shutdown();
    Ok(())
}
