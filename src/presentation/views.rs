use askama::{Error as AskamaError, Template};
use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    config::SiteSettings,
    domain::engagements::{Classified, Event, Talk},
};

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }

    pub fn origin(&self) -> &'static str {
        self.source
    }
}

pub fn render_template<T: Template>(template: T) -> Result<String, TemplateRenderError> {
    template.render().map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
    })
}

/// Pages produced by the markup step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
}

impl Page {
    pub fn name(self) -> &'static str {
        match self {
            Page::Index => "index",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.html", self.name())
    }
}

/// Render `page` from the classified engagements.
pub fn render_page(
    page: Page,
    classified: &Classified,
    site: &SiteSettings,
    built_at: OffsetDateTime,
) -> Result<String, TemplateRenderError> {
    match page {
        Page::Index => render_template(IndexTemplate {
            view: IndexView::new(classified, site, built_at),
        }),
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: IndexView,
}

#[derive(Clone)]
pub struct IndexView {
    pub title: String,
    pub updated_on: String,
    pub upcoming: Vec<EventCard>,
    pub past: Vec<EventCard>,
    pub talks: Vec<TalkCard>,
}

impl IndexView {
    pub fn new(classified: &Classified, site: &SiteSettings, built_at: OffsetDateTime) -> Self {
        Self {
            title: site.title.clone(),
            updated_on: built_at.date().to_string(),
            upcoming: classified
                .events
                .upcoming
                .iter()
                .map(EventCard::from)
                .collect(),
            past: classified.events.past.iter().map(EventCard::from).collect(),
            talks: classified.talks.iter().map(TalkCard::from).collect(),
        }
    }
}

#[derive(Clone)]
pub struct EventCard {
    pub name: String,
    pub location: String,
    pub url: String,
    pub iso_date: String,
    pub date_label: String,
    pub talk_key: String,
    pub talk_title: String,
}

impl From<&Event> for EventCard {
    fn from(event: &Event) -> Self {
        let (talk_key, talk_title) = event
            .talk
            .as_ref()
            .map(|talk| (talk.key.clone(), talk_title(talk)))
            .unwrap_or_default();

        Self {
            name: event.name.clone().unwrap_or_else(|| talk_title.clone()),
            location: event.location.clone().unwrap_or_default(),
            url: event.url.clone().unwrap_or_default(),
            iso_date: event.date.instant.date().to_string(),
            date_label: event.date.formatted.clone(),
            talk_key,
            talk_title,
        }
    }
}

#[derive(Clone)]
pub struct TalkCard {
    pub key: String,
    pub title: String,
    pub description: String,
    pub slides: String,
    pub video: String,
}

impl From<&Talk> for TalkCard {
    fn from(talk: &Talk) -> Self {
        Self {
            key: talk.key.clone(),
            title: talk_title(talk),
            description: talk.description.clone().unwrap_or_default(),
            slides: talk.slides.clone().unwrap_or_default(),
            video: talk.video.clone().unwrap_or_default(),
        }
    }
}

fn talk_title(talk: &Talk) -> String {
    talk.title.clone().unwrap_or_else(|| talk.key.clone())
}
