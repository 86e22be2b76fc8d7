//! Command template: the script a macro rule hands to the host.
//!
//! The payload is opaque to provisioning: it is stored verbatim as the
//! parameter of the rule's second action and executed by the host's script
//! runner. On command stations that understand the 2006 command set it sends
//! the 5-byte accessory/signal macro command (address `0x0001`); it always
//! follows up with the legacy 2-byte macro command, whose reply reports
//! whether the macro is empty.

use crate::id::MacroNumber;

/// Render the host script that fires macro `number`.
///
/// The decimal macro number is substituted in exactly two places: the macro
/// byte of the 5-byte command and the macro byte of the 2-byte command.
#[must_use]
pub fn render(number: MacroNumber) -> String {
    format!(
        r#"
import jmri
import java

class MyNceListener(jmri.jmrix.nce.NceListener):
  def message(self, msg):
    return
  def reply(self, msg):
    return

mnl = MyNceListener()

# Get the traffic controller
tc = None
try:
  tc = jmri.InstanceManager.getDefault( \
    jmri.jmrix.nce.NceSystemConnectionMemo).getNceTrafficController()
except:
  print "No Traffic Controller"

if (tc != None):
  if (tc.getCommandOptions() >=
      jmri.jmrix.nce.NceTrafficController.OPTION_2006):
    m = jmri.jmrix.nce.NceMessage(5)
    m.setElement(0, jmri.jmrix.nce.NceMessage.SEND_ACC_SIG_MACRO_CMD)
    m.setElement(1, 0x00) # addr_h
    m.setElement(2, 0x01) # addr_l
    m.setElement(3, 0x01) # Macro cmd
    m.setElement(4, {number})   # Macro #
    m.setBinary(True)
    m.setReplyLen(jmri.jmrix.nce.NceMessage.REPLY_1)
    tc.sendNceMessage(m, mnl)

  # Unfortunately, the new command doesn't tell us if the macro is
  # empty, so we send the old command for status.
  m = jmri.jmrix.nce.NceMessage(2)
  m.setElement(0, jmri.jmrix.nce.NceMessage.MACRO_CMD)
  m.setElement(1, {number}) # Macro #
  m.setBinary(True)
  m.setReplyLen(jmri.jmrix.nce.NceMessage.REPLY_1)
  tc.sendNceMessage(m, mnl)
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_substitute_number_in_both_commands() {
        let script = render(MacroNumber::new(7));
        assert!(script.contains("    m.setElement(4, 7)   # Macro #\n"));
        assert!(script.contains("  m.setElement(1, 7) # Macro #\n"));
    }

    #[test]
    fn should_substitute_exactly_twice() {
        let script = render(MacroNumber::new(4242));
        assert_eq!(script.matches("4242").count(), 2);
    }

    #[test]
    fn should_only_differ_at_substitution_sites() {
        let seven = render(MacroNumber::new(7)).replace(", 7)", ", N)");
        let nine = render(MacroNumber::new(9)).replace(", 9)", ", N)");
        assert_eq!(seven, nine);
    }

    #[test]
    fn should_keep_literal_template_structure() {
        let script = render(MacroNumber::new(0));
        assert!(script.starts_with("\nimport jmri\nimport java\n"));
        assert!(script.ends_with("  tc.sendNceMessage(m, mnl)\n"));
        assert!(script.contains("getDefault( \\\n"));
        assert!(script.contains("  print \"No Traffic Controller\"\n"));
        assert!(script.contains("jmri.jmrix.nce.NceMessage(5)"));
        assert!(script.contains("jmri.jmrix.nce.NceMessage(2)"));
        assert_eq!(script.matches("tc.sendNceMessage(m, mnl)").count(), 2);
    }

    #[test]
    fn should_render_bounds_of_the_index_range() {
        assert!(render(MacroNumber::new(0)).contains("m.setElement(4, 0)   # Macro #"));
        assert!(render(MacroNumber::new(u16::MAX)).contains("m.setElement(1, 65535) # Macro #"));
    }
}
