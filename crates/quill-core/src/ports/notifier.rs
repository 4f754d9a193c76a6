/// Change notifier - fan-out of the "changed" signal to live push channels.
///
/// Publishing is fire-and-forget: it cannot fail the mutation that triggered
/// it, and a slow or dead channel must not delay the others. Subscription is
/// an infrastructure concern; the domain only ever publishes.
pub trait ChangeNotifier: Send + Sync {
    fn notify_changed(&self);
}
