// Seams between the export pipeline and the remote services.
//
// `GitHubClient` and `ZenHubClient` implement these against the real APIs;
// `StubSource` serves fixture data for tests.

mod interface;
pub mod stub;

pub use interface::{BlockerMap, EpicMap, IssueQuery, IssueSource, MetadataSource};
pub use stub::StubSource;
