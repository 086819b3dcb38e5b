use maud::{html, Markup};

use crate::templates::layouts::{base, PageConfig};

/// Routes advertised on the index page, in display order.
pub const ROUTES: &[&str] = &[
    "/api/v1.0/precipitation",
    "/api/v1.0/stations",
    "/api/v1.0/tobs",
    "/api/v1.0/(start date)",
    "/api/v1.0/(start date)/(end date)",
];

pub fn index_page(api_base: &str) -> Markup {
    let config = PageConfig {
        title: "Hawaii Climate API",
        api_base,
    };

    base(&config, content())
}

fn content() -> Markup {
    html! {
        p {
            "Available Routes:"
            br;
            @for route in ROUTES {
                (route)
                br;
            }
            "*** Note: (start date) and (end date) should contain date values as YYYY-MM-DD ***"
        }
    }
}
