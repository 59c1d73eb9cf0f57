/*!
# Varugai

Registration desk for a district party office: a Tamil-language sign-up form
and an admin dashboard, with a Google Sheet (behind an Apps Script web app)
as the only store.

## Overview

Visitors fill in four fields on the form page. The server validates them and
forwards the record to the Apps Script endpoint, which appends a row to the
sheet. Administrators open the dashboard, which reads every row back from the
same endpoint and lets them search, narrow to a single day, and download the
result as CSV.

Nothing is stored locally. The sheet is the single source of truth and
ordering of concurrent submissions is left to it.

## Architecture

### Write path
- **Form** (`GET /`, `POST /`) - Server-rendered page, validated by [`registration`]
- **Proxy** (`POST /api/submit`) - Forwards any JSON body to the sheet and answers
  `{"result":"success"}` or `{"result":"error","error":...}`

### Read path
- **Admin table** (`GET /admin`) - Rows fetched per request, filtered by `?q=` and `?date=`
- **Export** (`GET /admin/export`) - The filtered rows as a UTF-8 CSV download
- **Rows API** (`GET /api/rows`) - The filtered rows as JSON

## Modules

- **row**: Row model, well-known columns, timestamp parsing and display
- **table**: Header set, search and same-day filters, cell views
- **registration**: Form fields, validation rules, sheet payload
- **downloader**: CSV export
- **config**: Environment configuration
- **error**: Error taxonomy and the `{result, error}` envelope
- **sheet**: Client for the Apps Script endpoint
- **render**: Handlebars page templates
- **app**: Routing and handlers

## Configuration

| Variable | Default |
|---|---|
| `GOOGLE_SHEET_WEB_APP_URL` | none |
| `BIND_ADDRESS` | `127.0.0.1:3000` |
| `DISPLAY_UTC_OFFSET` | `+05:30` |
| `EXPORT_FILE_PREFIX` | `registrations` |
| `STATIC_DIR` | `static` |

Logging goes through `env_logger`; set `RUST_LOG` to change the level.
*/

pub mod downloader;
pub mod registration;
pub mod row;
pub mod table;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod error;
#[cfg(feature = "web")]
pub mod render;
#[cfg(feature = "web")]
pub mod sheet;

pub use downloader::*;
pub use registration::*;
pub use row::*;
pub use table::*;
