//! Fixed digest wording per language.

use crate::domain::settings::Language;

#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub blog_section: &'static str,
    pub forum_section: &'static str,
    pub uncategorized: &'static str,
    pub category: &'static str,
    pub topic: &'static str,
    pub reply: &'static str,
    pub read_more_blog: &'static str,
    pub read_more_forum: &'static str,
    pub nothing_new: &'static str,
    pub nothing_new_hint: &'static str,
    pub go_to_site: &'static str,
    pub go_to_forum: &'static str,
}

const EN: Labels = Labels {
    blog_section: "Latest articles",
    forum_section: "Latest forum posts",
    uncategorized: "Uncategorized",
    category: "Category",
    topic: "Topic",
    reply: "Reply",
    read_more_blog: "Read more on the website...",
    read_more_forum: "Read more on the forum...",
    nothing_new: "There are no new posts or articles this week.",
    nothing_new_hint: "You can still browse older articles and discussions on our website and forum.",
    go_to_site: "Go to the website",
    go_to_forum: "Go to the forum",
};

const SK: Labels = Labels {
    blog_section: "Najnovšie články z webu",
    forum_section: "Najnovšie príspevky z fóra",
    uncategorized: "Bez kategórie",
    category: "Kategória",
    topic: "Téma",
    reply: "Odpoveď",
    read_more_blog: "Čítať ďalej na webe...",
    read_more_forum: "Čítať ďalej na stránke fóra...",
    nothing_new: "Tento týždeň nie sú žiadne nové príspevky ani články.",
    nothing_new_hint: "Môžete si pozrieť staršie články alebo diskusie na našom webe a fóre.",
    go_to_site: "Prejsť na web",
    go_to_forum: "Prejsť na fórum",
};

impl Labels {
    pub fn for_language(language: Language) -> &'static Labels {
        match language {
            Language::En => &EN,
            Language::Sk => &SK,
        }
    }
}
