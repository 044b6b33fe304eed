//! Static page persistence.

use crate::model::page::{PageId, StaticPage};
use crate::repo::{
    classify_write_error, ensure_connection_ready, parse_uuid, RepoError, RepoResult, WriteKind,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const PAGE_TABLES: &[(&str, &[&str])] = &[(
    "static_pages",
    &["uuid", "slug", "head", "title", "short", "content"],
)];

const PAGE_SELECT_SQL: &str = "SELECT
    uuid,
    slug,
    head,
    title,
    short,
    content
FROM static_pages";

pub trait PageRepository {
    fn create_page(&self, page: &StaticPage) -> RepoResult<PageId>;
    fn update_page(&self, page: &StaticPage) -> RepoResult<()>;
    fn get_page(&self, id: PageId) -> RepoResult<Option<StaticPage>>;
    fn get_page_by_slug(&self, slug: &str) -> RepoResult<Option<StaticPage>>;
    /// Lists pages ordered by slug.
    fn list_pages(&self) -> RepoResult<Vec<StaticPage>>;
    fn delete_page(&self, id: PageId) -> RepoResult<()>;
}

pub struct SqlitePageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePageRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, PAGE_TABLES)?;
        Ok(Self { conn })
    }

    fn query_one(&self, condition: &str, value: &str) -> RepoResult<Option<StaticPage>> {
        self.conn
            .query_row(
                &format!("{PAGE_SELECT_SQL} WHERE {condition};"),
                [value],
                |row| Ok(parse_page_row(row)),
            )
            .optional()?
            .transpose()
    }
}

impl PageRepository for SqlitePageRepository<'_> {
    fn create_page(&self, page: &StaticPage) -> RepoResult<PageId> {
        page.validate()?;

        self.conn
            .execute(
                "INSERT INTO static_pages (uuid, slug, head, title, short, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    page.id.to_string(),
                    page.slug.as_str(),
                    page.head.as_deref(),
                    page.title.as_deref(),
                    page.short.as_str(),
                    page.content.as_str(),
                ],
            )
            .map_err(|err| classify_write_error(err, "static_pages", WriteKind::Insert))?;

        Ok(page.id)
    }

    fn update_page(&self, page: &StaticPage) -> RepoResult<()> {
        page.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE static_pages
                 SET
                    slug = ?1,
                    head = ?2,
                    title = ?3,
                    short = ?4,
                    content = ?5
                 WHERE uuid = ?6;",
                params![
                    page.slug.as_str(),
                    page.head.as_deref(),
                    page.title.as_deref(),
                    page.short.as_str(),
                    page.content.as_str(),
                    page.id.to_string(),
                ],
            )
            .map_err(|err| classify_write_error(err, "static_pages", WriteKind::Update))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "static page",
                id: page.id,
            });
        }
        Ok(())
    }

    fn get_page(&self, id: PageId) -> RepoResult<Option<StaticPage>> {
        self.query_one("uuid = ?1", id.to_string().as_str())
    }

    fn get_page_by_slug(&self, slug: &str) -> RepoResult<Option<StaticPage>> {
        self.query_one("slug = ?1", slug)
    }

    fn list_pages(&self) -> RepoResult<Vec<StaticPage>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAGE_SELECT_SQL} ORDER BY slug ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut pages = Vec::new();
        while let Some(row) = rows.next()? {
            pages.push(parse_page_row(row)?);
        }
        Ok(pages)
    }

    fn delete_page(&self, id: PageId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM static_pages WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                kind: "static page",
                id,
            });
        }
        Ok(())
    }
}

fn parse_page_row(row: &Row<'_>) -> RepoResult<StaticPage> {
    let uuid_text: String = row.get("uuid")?;
    let page = StaticPage {
        id: parse_uuid(&uuid_text, "static_pages.uuid")?,
        slug: row.get("slug")?,
        head: row.get("head")?,
        title: row.get("title")?,
        short: row.get("short")?,
        content: row.get("content")?,
    };
    page.validate()?;
    Ok(page)
}
