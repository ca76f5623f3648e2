use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::interaction::{ClickRequest, PickRequest, PickResponse};
use super::api::sky::FrameResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::sky::frame,
        super::api::sky::tracked,
        super::api::interaction::pick,
        super::api::interaction::click,
        super::api::interaction::close,
        super::api::sources::list,
    ),
    components(
        schemas(
            FrameResponse,
            PickRequest,
            PickResponse,
            ClickRequest,
            ErrorResponse,
            crate::sky::FrameEntry,
            crate::sky::PlotArrays,
            crate::sky::TrackedBody,
            crate::interaction::Toggle,
            crate::interaction::MouseButton,
            crate::interaction::ClickOutcome,
            crate::observer::ObserverState,
            crate::sources::SourceReport,
            crate::sources::CacheStatus,
        )
    ),
    info(
        title = "Sat-O-Sky API",
        description = "Live sky plot of every catalogued satellite above the observer's horizon",
        version = "0.1.0"
    ),
    tags(
        (name = "sky", description = "Published frames and tracked bodies"),
        (name = "interaction", description = "Pick, click and close events from the plot"),
        (name = "sources", description = "TLE source status")
    )
)]
pub struct ApiDoc;
