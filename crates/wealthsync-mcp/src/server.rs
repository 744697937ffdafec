use chrono::Utc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde::Deserialize;
use wealthsync_core::guidelines::GUIDELINES;

use crate::context::{AppContext, DEFAULT_UPCOMING};

fn respond(result: Result<String, String>) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(e)]),
    })
}

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ClientRequest {
    /// Client id (file name without .json), as returned by list_clients
    client_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetClientRequest {
    /// Client id. Must match the "id" field inside data. Letters, digits, '-', '_' and '.' only.
    client_id: String,
    /// The complete client profile as a JSON string: {id, clientName, clientType?, status?, entities: [{id, name, type}], assets: [{id, name, category, value, entityId?, custodian?}], liabilities: [{id, name, category, balance, entityId?, interestRate?, lender?}], advisors: [{id, name, specialty, firm?, isPrimary?, lastContactDate?}], deadlines: [{id, title, dueDate, category, status, recurrence?}], meetings?, goals?, concerns?, notes?}
    data: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct UpcomingRequest {
    client_id: String,
    /// Maximum number of deadlines to return (default 5)
    count: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CompleteDeadlineRequest {
    client_id: String,
    /// Id of the deadline to mark completed
    deadline_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GenerateReportRequest {
    client_id: String,
    /// "wealth_audit", "advisor_coordination", "compliance_calendar", "estate_summary" or "quarterly_review"
    kind: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SummarizeRequest {
    /// "document", "meeting", "report" or "general" (default)
    kind: Option<String>,
    /// Text to summarize
    text: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ExportCsvRequest {
    /// "deadlines", "advisors" or "wealth_summary" (need client_id), or "risks", "advisor_actions" or "compliance_calendar" (need report)
    what: String,
    client_id: Option<String>,
    /// JSON returned by generate_report
    report: Option<String>,
}

// --- Server ---

#[derive(Clone)]
pub struct WealthServer {
    ctx: AppContext,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WealthServer {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List the ids of all stored clients")]
    fn list_clients(&self) -> Result<CallToolResult, McpError> {
        respond(self.ctx.list_clients())
    }

    #[tool(description = "Get the full JSON profile of a client")]
    fn get_client(
        &self,
        Parameters(req): Parameters<ClientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.get_client(&req.client_id))
    }

    #[tool(
        description = "Create or overwrite a client with a complete profile. The JSON is validated before anything is written. Enum fields use snake_case: asset category cash|investments|real_estate|alternatives|other, liability category mortgage|loan|credit|other, entity type personal|trust|llc|foundation|other, advisor specialty cpa|estate_attorney|wealth_manager|insurance|banker|other, deadline category tax|legal|insurance|trust|investment|other, deadline status upcoming|due_soon|overdue|completed, recurrence one_time|annual|quarterly|monthly. Dates are YYYY-MM-DD."
    )]
    fn set_client(
        &self,
        Parameters(req): Parameters<SetClientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.set_client(&req.client_id, &req.data))
    }

    #[tool(description = "Delete a client and its net worth snapshots")]
    fn delete_client(
        &self,
        Parameters(req): Parameters<ClientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.delete_client(&req.client_id))
    }

    #[tool(
        description = "Deadline notifications for a client: overdue, due today, due tomorrow and due within a week, most urgent first. Returns {unreadCount, urgentCount, notifications: [{id, type, title, message, priority, linkedDeadlineId, createdAt, read}]}"
    )]
    fn get_notifications(
        &self,
        Parameters(req): Parameters<ClientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.notifications(&req.client_id, Utc::now()))
    }

    #[tool(description = "Open deadlines for a client ordered by due date, with current statuses")]
    fn upcoming_deadlines(
        &self,
        Parameters(req): Parameters<UpcomingRequest>,
    ) -> Result<CallToolResult, McpError> {
        let count = req.count.unwrap_or(DEFAULT_UPCOMING);
        respond(self.ctx.upcoming_deadlines(&req.client_id, count, Utc::now()))
    }

    #[tool(
        description = "Mark a deadline completed. Recurring deadlines (monthly, quarterly, annual) get their next occurrence added. Returns {completed, next}."
    )]
    fn complete_deadline(
        &self,
        Parameters(req): Parameters<CompleteDeadlineRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.ctx
                .complete_deadline(&req.client_id, &req.deadline_id, Utc::now()),
        )
    }

    #[tool(
        description = "Record a net worth snapshot for a client (totals by entity and asset category) and show the change since the previous snapshot"
    )]
    fn take_snapshot(
        &self,
        Parameters(req): Parameters<ClientRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.take_snapshot(&req.client_id, Utc::now()))
    }

    #[tool(
        description = "Generate an AI report for a client. Returns {id, kind, clientId, title, narrative: {executiveSummary, recommendations}, findings: {netWorthSummary?, risks, advisorActions, complianceCalendar}, rawProviderText, usage, generatedAt}. Fails rather than returning a partial report when the AI output does not match the schema for the kind."
    )]
    async fn generate_report(
        &self,
        Parameters(req): Parameters<GenerateReportRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.ctx
                .generate_report(&req.client_id, &req.kind, context.ct.clone())
                .await,
        )
    }

    #[tool(description = "Summarize a document, clean up meeting notes, or answer a general question")]
    async fn summarize_text(
        &self,
        Parameters(req): Parameters<SummarizeRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        respond(
            self.ctx
                .summarize(req.kind.as_deref(), &req.text, context.ct.clone())
                .await,
        )
    }

    #[tool(description = "Export client records or report findings as CSV")]
    fn export_csv(
        &self,
        Parameters(req): Parameters<ExportCsvRequest>,
    ) -> Result<CallToolResult, McpError> {
        respond(self.ctx.export_csv(
            &req.what,
            req.client_id.as_deref(),
            req.report.as_deref(),
        ))
    }

    #[tool(description = "Get the advisory guidelines that every generated report follows")]
    fn get_guidelines(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(GUIDELINES)]))
    }
}

const INSTRUCTIONS: &str = "WealthSync manages family office client records (entities, assets, \
liabilities, advisors, deadlines, meetings) and generates AI reports from them.\n\n\
Start with list_clients and get_client. Use get_notifications or upcoming_deadlines to see what \
needs attention, and complete_deadline when something is done. generate_report produces one of \
five report kinds; pass its JSON to export_csv to get findings as CSV.";

#[tool_handler]
impl ServerHandler for WealthServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!("{INSTRUCTIONS}\n\n## Advisory Guidelines\n{GUIDELINES}");
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
