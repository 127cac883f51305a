use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{entities, handlers, services};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Repair Shop API",
        version = "1.0.0",
        description = r#"
# Repair Shop API

Backend for a maintenance workshop: users and roles, machines assigned to
clients, providers and spare parts, repair requests with their lifecycle,
receipts and receipt batches, and in-app notifications mirrored by email.

## Repair lifecycle

`PENDING -> TECHNICIAN_ASSIGNED -> PRE_FINALIZED -> FINALIZED`

## Responses

Successful responses use the envelope:

```json
{ "success": true, "data": { }, "timestamp": "2024-01-01T00:00:00Z" }
```

Failures use:

```json
{ "success": false, "error": "Bad Request", "message": "...", "timestamp": "2024-01-01T00:00:00Z" }
```
        "#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers((url = "http://localhost:8080", description = "Local development")),
    tags(
        (name = "auth", description = "Two-step login and registration"),
        (name = "users", description = "User management"),
        (name = "machines", description = "Machine inventory"),
        (name = "machine-assignments", description = "Which client holds which machine"),
        (name = "providers", description = "Part providers"),
        (name = "parts", description = "Spare parts and stock"),
        (name = "repair-requests", description = "Repair requests and their lifecycle"),
        (name = "receipts", description = "Receipts"),
        (name = "receipt-batches", description = "Receipt batches and revenue split"),
        (name = "notifications", description = "In-app notifications")
    ),
    paths(
        handlers::auth::login,
        handlers::auth::verify_code,
        handlers::auth::resend_code,
        handlers::auth::register,

        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::list_technicians,
        handlers::users::get_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        handlers::machines::list_machines,
        handlers::machines::create_machine,
        handlers::machines::get_machine,
        handlers::machines::update_machine,
        handlers::machines::delete_machine,

        handlers::machine_assignments::assign_machine,
        handlers::machine_assignments::reassign_machine,
        handlers::machine_assignments::unassign_machine,
        handlers::machine_assignments::current_client,
        handlers::machine_assignments::machines_by_client,

        handlers::providers::list_providers,
        handlers::providers::create_provider,
        handlers::providers::get_provider,
        handlers::providers::update_provider,
        handlers::providers::delete_provider,
        handlers::providers::provider_parts,

        handlers::parts::list_parts,
        handlers::parts::create_part,
        handlers::parts::low_stock,
        handlers::parts::get_part,
        handlers::parts::update_part,
        handlers::parts::delete_part,
        handlers::parts::set_stock,

        handlers::repair_requests::list_requests,
        handlers::repair_requests::create_request,
        handlers::repair_requests::get_request,
        handlers::repair_requests::update_request,
        handlers::repair_requests::delete_request,
        handlers::repair_requests::assign_technician,
        handlers::repair_requests::mark_repair_done,
        handlers::repair_requests::finalize,
        handlers::repair_requests::add_part_used,
        handlers::repair_requests::parts_used,

        handlers::receipts::list_receipts,
        handlers::receipts::create_receipt,
        handlers::receipts::get_receipt,
        handlers::receipts::update_receipt,
        handlers::receipts::delete_receipt,

        handlers::receipt_batches::list_batches,
        handlers::receipt_batches::create_batch,
        handlers::receipt_batches::get_batch,
        handlers::receipt_batches::delete_batch,

        handlers::notifications::create_notification,
        handlers::notifications::recent_notifications,
        handlers::notifications::user_notifications,
        handlers::notifications::unread_count,
        handlers::notifications::mark_all_as_read,
        handlers::notifications::mark_as_read,
        handlers::notifications::delete_notification,
    ),
    components(
        schemas(
            crate::ResponseMeta,
            crate::errors::ErrorResponse,

            entities::user::Model,
            entities::user::UserRole,
            entities::machine::Model,
            entities::machine::MachineStatus,
            entities::machine_client::Model,
            entities::provider::Model,
            entities::part::Model,
            entities::part::PartStatus,
            entities::part_used::Model,
            entities::repair_request::Model,
            entities::repair_request::RepairState,
            entities::repair_request::Severity,
            entities::receipt::Model,
            entities::receipt_batch::Model,
            entities::notification::Model,
            entities::notification::NotificationType,

            services::auth::LoginInput,
            services::auth::VerifyCodeInput,
            services::auth::ResendCodeInput,
            services::auth::RegisterInput,
            services::auth::LoginChallenge,
            services::users::CreateUserInput,
            services::users::UpdateUserInput,
            services::machines::CreateMachineInput,
            services::machines::UpdateMachineInput,
            services::machine_assignments::AssignMachineInput,
            services::machine_assignments::ReassignMachineInput,
            services::machine_assignments::CurrentClient,
            services::providers::CreateProviderInput,
            services::providers::UpdateProviderInput,
            services::parts::CreatePartInput,
            services::parts::UpdatePartInput,
            services::parts::SetStockInput,
            services::repair_requests::CreateRepairRequestInput,
            services::repair_requests::UpdateRepairRequestInput,
            services::repair_requests::AssignTechnicianInput,
            services::repair_requests::RepairDoneInput,
            services::repair_requests::AddPartUsedInput,
            services::repair_requests::RepairOutcome,
            services::receipts::CreateReceiptInput,
            services::receipts::UpdateReceiptInput,
            services::receipt_batches::ReceiptLineInput,
            services::receipt_batches::CreateReceiptBatchInput,
            services::receipt_batches::ReceiptBatchDetail,
            services::notifications::CreateNotificationInput,
            services::notifications::DeliveryReport,
            services::notifications::FailedDelivery,
            handlers::notifications::UnreadCount,
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDocV1::openapi())
}
